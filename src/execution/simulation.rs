//! Trade execution simulation

use std::time::Instant;
use tracing::info;
use crate::types::{
    ExecutionMode, ExecutionResult, ExecutionStatus, LegOutcome, LegStatus, Opportunity, Side,
};

/// Fabricates a completed result at the opportunity's quoted prices.
/// Nothing is sent to any venue.
pub fn create_simulated_execution(opportunity: &Opportunity, start_time: Instant) -> ExecutionResult {
    let leg = |side: Side| {
        let (venue, price) = match side {
            Side::Buy => (&opportunity.buy_venue, opportunity.buy_price),
            Side::Sell => (&opportunity.sell_venue, opportunity.sell_price),
        };
        LegOutcome {
            venue: venue.clone(),
            side,
            status: LegStatus::Success,
            order_id: Some(format!("sim-{}", uuid::Uuid::new_v4().simple())),
            filled_quantity: opportunity.trade_quantity,
            filled_price: Some(price),
            error_message: None,
        }
    };

    info!(
        "🎭 [DRY RUN] Would buy {:.4} {} on {} and sell on {}",
        opportunity.trade_quantity, opportunity.symbol, opportunity.buy_venue, opportunity.sell_venue
    );

    ExecutionResult {
        id: uuid::Uuid::new_v4().to_string(),
        opportunity_id: opportunity.id.clone(),
        timestamp: chrono::Utc::now(),
        mode: ExecutionMode::Simulated,
        buy_outcome: leg(Side::Buy),
        sell_outcome: leg(Side::Sell),
        realized_profit_estimate: opportunity.estimated_profit_usd,
        status: ExecutionStatus::Completed,
        execution_time_ms: start_time.elapsed().as_millis() as u64,
    }
}
