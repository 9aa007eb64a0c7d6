//! Setup verification for the CEX arbitrage bot
//!
//! Run with: cargo run --bin check-setup
//!
//! Checks the `.env` configuration, masks and lists credentials, and tests
//! every configured venue. Exits non-zero if anything fails.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use cex_arb_bot::{
    cycle::fetch_with_fallback,
    utils::{mask_secret, to_percent},
    venues::{build_venue, VenueClient},
    Config, ExecutionMode,
};

const RULE: &str = "============================================================";

fn check_configuration(config: &Config) -> bool {
    println!("Checking configuration...");

    if Path::new(".env").exists() {
        println!("  ✓ .env file exists");
    } else {
        println!("  ⚠ .env file not found, using process environment and defaults");
    }

    for venue in &config.venues {
        let prefix = venue.id.as_str().to_uppercase();
        for (name, value) in [("API_KEY", &venue.api_key), ("API_SECRET", &venue.api_secret)] {
            match value {
                Some(value) => println!("  ✓ {}_{} = {}", prefix, name, mask_secret(value)),
                None => println!("  ⚠ {}_{} not configured", prefix, name),
            }
        }
        println!("    {} taker fee {:.3}%", venue.id, to_percent(venue.fee_rate));
    }

    match config.mode {
        ExecutionMode::Simulated => println!("\n  ✓ DRY_RUN mode enabled (safe for testing)"),
        ExecutionMode::Live => {
            println!("\n  ⚠ DRY_RUN mode disabled (LIVE TRADING)");
            println!("  Make sure you want to trade with real money!");
        }
    }

    match config.validate() {
        Ok(()) => {
            println!("  ✓ Configuration is valid");
            true
        }
        Err(e) => {
            println!("  ✗ {}", e);
            false
        }
    }
}

async fn check_connectivity(config: &Config) -> bool {
    println!("\nChecking venue connectivity...");
    let timeout = config.quote_timeout().max(Duration::from_secs(1));
    let mut reachable = 0;

    for venue_config in &config.venues {
        let client = match build_venue(venue_config, config.venue_timeout()) {
            Ok(client) => client,
            Err(e) => {
                println!("  ✗ {}: {}", venue_config.id, e);
                continue;
            }
        };

        if let Err(e) = client.connect().await {
            println!("  ✗ {} connection failed: {}", venue_config.id, e);
            continue;
        }
        println!("  ✓ {} connection successful", venue_config.id);
        reachable += 1;

        for symbol in &config.symbols {
            match fetch_with_fallback(client.as_ref(), symbol, &config.quote_currencies, timeout).await {
                Ok(quote) => println!(
                    "    {} bid {} / ask {}",
                    quote.pair(),
                    quote.bid.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
                    quote.ask.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
                ),
                Err(e) => println!("    ⚠ {} quote unavailable: {}", symbol, e),
            }
        }
    }

    reachable >= 2
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let config = Config::load();

    println!("{RULE}");
    println!("CEX ARBITRAGE BOT - SETUP VERIFICATION");
    println!("{RULE}");

    let results = [
        ("Configuration", check_configuration(&config)),
        ("Venue Connectivity", check_connectivity(&config).await),
    ];

    println!("\n{RULE}");
    println!("SUMMARY");
    println!("{RULE}");
    for (name, passed) in &results {
        println!("{:25} {}", name, if *passed { "✓ PASS" } else { "✗ FAIL" });
    }
    println!("{RULE}");

    if results.iter().all(|(_, passed)| *passed) {
        println!("\n✓ All checks passed! You're ready to run the bot.");
        println!("\nTo start in dry run mode:\n  cargo run --release --bin cex-arb-bot");
        ExitCode::SUCCESS
    } else {
        println!("\n⚠ Some checks failed. Please fix the issues above.");
        ExitCode::FAILURE
    }
}
