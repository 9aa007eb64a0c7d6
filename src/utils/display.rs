//! Display and printing utilities

use tracing::{error, info, warn};
use crate::{
    stats::Statistics,
    types::{ExecutionResult, ExecutionStatus, LegOutcome, Opportunity, VenueHealth, VenueState},
    utils::to_percent,
};

pub fn print_opportunity(rank: usize, opportunity: &Opportunity) {
    warn!("\n🎯 ARBITRAGE OPPORTUNITY #{} ({})", rank, opportunity.id);
    warn!("📍 Symbol: {}", opportunity.symbol);
    warn!("📋 Strategy: buy on {} / sell on {}", opportunity.buy_venue, opportunity.sell_venue);
    warn!("💰 Profit Analysis:");
    warn!("   Buy Price:  {:.6} {}", opportunity.buy_price, opportunity.buy_quote_currency);
    warn!("   Sell Price: {:.6} {}", opportunity.sell_price, opportunity.sell_quote_currency);
    warn!("   Gross: {:.3}%", to_percent(opportunity.gross_profit_pct));
    warn!("   Net:   {:.3}%", to_percent(opportunity.net_profit_pct));
    warn!("   Size:  {:.4} {}", opportunity.trade_quantity, opportunity.symbol);
    warn!("   Estimated Profit: ${:.2}", opportunity.estimated_profit_usd);
}

pub fn print_execution(execution: &ExecutionResult) {
    match execution.status {
        ExecutionStatus::Completed => {
            warn!("\n✅ TRADE EXECUTION #{} ({})", execution.id, execution.mode);
            print_leg(&execution.buy_outcome);
            print_leg(&execution.sell_outcome);
            warn!("   Realized Profit (est.): ${:.2}", execution.realized_profit_estimate);
            warn!("   Execution Time: {}ms", execution.execution_time_ms);
        }
        ExecutionStatus::Partial => {
            error!("\n🚨 PARTIAL EXECUTION #{} ({})", execution.id, execution.mode);
            print_leg(&execution.buy_outcome);
            print_leg(&execution.sell_outcome);
            error!("   Unhedged Exposure: ${:.2}", execution.unhedged_exposure());
        }
        ExecutionStatus::Aborted => {
            error!("\n❌ TRADE EXECUTION ABORTED #{}", execution.id);
            let reason = execution
                .buy_outcome
                .error_message
                .as_deref()
                .unwrap_or("Unknown");
            error!("   Error: {}", reason);
        }
    }
}

fn print_leg(leg: &LegOutcome) {
    match (&leg.order_id, leg.filled_price) {
        (Some(order_id), Some(price)) => warn!(
            "   {} on {}: {:.4} @ {:.6} (order {})",
            leg.side, leg.venue, leg.filled_quantity, price, order_id
        ),
        _ => warn!(
            "   {} on {}: {:?} {}",
            leg.side,
            leg.venue,
            leg.status,
            leg.error_message.as_deref().unwrap_or("")
        ),
    }
}

pub fn print_venue_health(health: &[VenueHealth]) {
    for venue in health {
        match &venue.state {
            VenueState::Active => info!(
                "   {} OK (failures: {}, last quote: {})",
                venue.venue,
                venue.consecutive_failures,
                venue
                    .last_quote_at
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "never".to_string())
            ),
            VenueState::Disabled(reason) => info!("   {} DISABLED ({})", venue.venue, reason),
        }
    }
}

pub fn print_session_stats(stats: &Statistics) {
    info!("\n📊 Session Statistics ({} minutes)", stats.runtime_minutes());
    info!("   📈 ARBITRAGE:");
    info!("     Cycles run: {}", stats.cycles_run);
    info!("     Opportunities found: {}", stats.opportunities_found);
    info!("     Quote failures: {}", stats.quote_failures);

    info!("   🚀 TRADE EXECUTION:");
    info!(
        "     Trades executed: {} (simulated: {}, live: {})",
        stats.trades_executed, stats.simulated_trades, stats.live_trades
    );
    info!("     Partial: {}, Aborted: {}", stats.partial_executions, stats.aborted_executions);
    info!("     Success rate: {:.1}%", stats.success_rate());
    info!("     Cumulative estimated profit: ${:.2}", stats.cumulative_estimated_profit_usd);

    if stats.unhedged_exposure_usd > rust_decimal::Decimal::ZERO {
        error!("     ⚠️  Unhedged exposure: ${:.2}", stats.unhedged_exposure_usd);
    }

    info!("");
}

pub fn print_final_statistics(stats: &Statistics) {
    info!("\n🏁 FINAL STATISTICS");
    print_session_stats(stats);
}
