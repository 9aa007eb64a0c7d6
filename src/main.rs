//! CEX Arbitrage Bot - Main Entry Point

use cex_arb_bot::*;
use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info, warn};
use cex_arb_bot::reporting::{ConsoleSink, FanoutReporter, JsonlSink};
use cex_arb_bot::venues::{build_venue, VenueClient, VenueMap};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = CONFIG.clone();

    // Initialize logging
    utils::setup_output_directories(&config.output_dir)?;
    let _logging_guard = utils::setup_logging(&config.output_dir)?;

    info!("💱 CEX Arbitrage Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Mode: {}", config.mode);
    info!("   Symbols: {}", config.symbols.join(", "));
    info!("   Quote currencies: {}", config.quote_currencies.join(", "));
    for venue in &config.venues {
        info!("   Venue: {} (fee {:.3}%)", venue.id, utils::to_percent(venue.fee_rate));
    }
    info!("   Min Profit: {:.3}%", utils::to_percent(config.min_profit_pct));
    info!("   Trade Amount: ${}", config.trade_amount_usd);
    info!("   Check Interval: {}s", config.check_interval_seconds);

    if config.mode == ExecutionMode::Live {
        warn!("   ⚠️  LIVE TRADING - real orders will be placed");
        if config.size_by_balance {
            info!("   Trade size limited by venue balances");
        }
    } else {
        info!("   Dry run - no orders will be placed");
    }

    // Validate configuration
    config.validate()?;

    let venues = connect_venues(&config).await?;

    // Setup shutdown handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("\n📛 Received shutdown signal (Ctrl+C)...");
        let _ = shutdown_tx.send(true);
    });

    let reporter = FanoutReporter::new()
        .with_sink(ConsoleSink::default())
        .with_sink(JsonlSink::new(&config.output_dir));

    let mut cycle = ExecutionCycle::new(&config, venues, reporter);
    let stats = cycle.run(shutdown_rx).await;

    if stats.unhedged_exposure_usd > rust_decimal::Decimal::ZERO {
        error!(
            "🚨 {} partial execution(s) left ${:.2} unhedged, check venue balances",
            stats.partial_executions, stats.unhedged_exposure_usd
        );
    }

    Ok(())
}

/// Builds and connects every configured venue. Unreachable venues are left
/// out; fewer than two reachable ones cannot produce an arbitrage.
async fn connect_venues(config: &Config) -> Result<VenueMap> {
    let mut venues = VenueMap::new();

    for venue_config in &config.venues {
        let client = match build_venue(venue_config, config.venue_timeout()) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to set up {}: {}", venue_config.id, e);
                continue;
            }
        };

        info!("🔗 Connecting to {}...", venue_config.id);
        match client.connect().await {
            Ok(()) => {
                venues.insert(venue_config.id.clone(), client);
            }
            Err(e) => error!("❌ Leaving {} out of this run: {}", venue_config.id, e),
        }
    }

    if venues.len() < 2 {
        return Err(BotError::NoVenuesReachable { reachable: venues.len() }.into());
    }
    Ok(venues)
}
