//! Order dispatch for a selected opportunity

use rust_decimal::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use crate::{
    arbitrage::calculate_optimal_trade_amount,
    config::Config,
    errors::{OrderError, QuoteError},
    execution::simulation::create_simulated_execution,
    types::{
        ExecutionMode, ExecutionResult, ExecutionStatus, FeeSchedule, LegOutcome, LegStatus,
        Opportunity, OrderResult, Side, VenueId,
    },
    venues::{VenueClient, VenueMap},
};

/// Sends the buy and sell legs of one opportunity, or fabricates them in
/// simulation mode.
///
/// The two legs form one unit: once the buy is sent the dispatcher always
/// finishes the pair before returning. There is no retry or unwind; a
/// failed sell after a filled buy comes back as `Partial`.
pub struct OrderDispatcher {
    pub mode: ExecutionMode,
    pub order_timeout: Duration,
    pub size_by_balance: bool,
    pub trade_amount_usd: Decimal,
    pub fees: FeeSchedule,
}

impl OrderDispatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            mode: config.mode,
            order_timeout: config.order_timeout(),
            size_by_balance: config.size_by_balance,
            trade_amount_usd: config.trade_amount_usd,
            fees: config.fee_schedule(),
        }
    }

    pub async fn dispatch(&self, opportunity: &Opportunity, venues: &VenueMap) -> ExecutionResult {
        let start = Instant::now();

        info!("🚀 Executing opportunity {} ({})", opportunity.id, self.mode);

        match self.mode {
            ExecutionMode::Simulated => create_simulated_execution(opportunity, start),
            ExecutionMode::Live => self.execute_live(opportunity, venues, start).await,
        }
    }

    async fn execute_live(
        &self,
        opportunity: &Opportunity,
        venues: &VenueMap,
        start: Instant,
    ) -> ExecutionResult {
        let (buy_client, sell_client) = match (
            venues.get(&opportunity.buy_venue),
            venues.get(&opportunity.sell_venue),
        ) {
            (Some(buy), Some(sell)) => (buy, sell),
            _ => {
                return self.aborted(opportunity, start, "venue client not available".to_string());
            }
        };

        let quantity = if self.size_by_balance {
            match self.balance_limited_quantity(opportunity, buy_client, sell_client).await {
                Ok(quantity) if quantity > Decimal::ZERO => quantity,
                Ok(_) => {
                    return self.aborted(opportunity, start, "insufficient balance to size trade".to_string());
                }
                Err(e) => {
                    return self.aborted(opportunity, start, format!("balance check failed: {}", e));
                }
            }
        } else {
            opportunity.trade_quantity
        };

        info!("1. Buy {:.4} {} on {}", quantity, opportunity.symbol, opportunity.buy_venue);
        let buy = self
            .place_leg(buy_client, &opportunity.symbol, &opportunity.buy_quote_currency, Side::Buy, quantity)
            .await;

        let buy = buy.and_then(|order| require_fill(order, Side::Buy));
        let buy_order = match buy {
            Ok(order) => order,
            Err(e) => {
                error!("Failed to place buy order on {}: {}", opportunity.buy_venue, e);
                return self.finish(
                    opportunity,
                    start,
                    failed_leg(&opportunity.buy_venue, Side::Buy, &e),
                    skipped_leg(&opportunity.sell_venue, Side::Sell),
                    ExecutionStatus::Aborted,
                );
            }
        };
        let buy_outcome = filled_leg(&opportunity.buy_venue, Side::Buy, &buy_order, opportunity.buy_price);

        // Hedge what was actually bought.
        let sell_quantity = buy_order.filled_quantity;

        info!("2. Sell {:.4} {} on {}", sell_quantity, opportunity.symbol, opportunity.sell_venue);
        let sell = self
            .place_leg(sell_client, &opportunity.symbol, &opportunity.sell_quote_currency, Side::Sell, sell_quantity)
            .await
            .and_then(|order| require_fill(order, Side::Sell));

        match sell {
            Ok(order) => {
                let sell_outcome = filled_leg(&opportunity.sell_venue, Side::Sell, &order, opportunity.sell_price);
                self.finish(opportunity, start, buy_outcome, sell_outcome, ExecutionStatus::Completed)
            }
            Err(e) => {
                let sell_outcome = failed_leg(&opportunity.sell_venue, Side::Sell, &e);
                let result = self.finish(opportunity, start, buy_outcome, sell_outcome, ExecutionStatus::Partial);
                error!(
                    opportunity_id = %opportunity.id,
                    opportunity = %opportunity,
                    buy_leg = ?result.buy_outcome,
                    sell_leg = ?result.sell_outcome,
                    exposure_usd = %result.unhedged_exposure(),
                    "🚨 PARTIAL EXECUTION: buy filled but sell failed ({}). Unhedged {} inventory, manual intervention needed!",
                    e,
                    opportunity.symbol
                );
                result
            }
        }
    }

    async fn place_leg(
        &self,
        client: &Arc<dyn VenueClient>,
        symbol: &str,
        quote_currency: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResult, OrderError> {
        tokio::time::timeout(
            self.order_timeout,
            client.place_order(symbol, quote_currency, side, quantity),
        )
        .await
        .unwrap_or(Err(OrderError::Timeout))
    }

    async fn balance_limited_quantity(
        &self,
        opportunity: &Opportunity,
        buy_client: &Arc<dyn VenueClient>,
        sell_client: &Arc<dyn VenueClient>,
    ) -> Result<Decimal, QuoteError> {
        let buy_balance = tokio::time::timeout(
            self.order_timeout,
            buy_client.fetch_balance(&opportunity.buy_quote_currency),
        )
        .await
        .unwrap_or(Err(QuoteError::Timeout))?;

        let sell_balance = tokio::time::timeout(
            self.order_timeout,
            sell_client.fetch_balance(&opportunity.symbol),
        )
        .await
        .unwrap_or(Err(QuoteError::Timeout))?;

        let quantity = calculate_optimal_trade_amount(opportunity, buy_balance, sell_balance, self.trade_amount_usd);
        if quantity < opportunity.trade_quantity {
            warn!(
                "Trade size reduced by balances: {:.4} -> {:.4} {} ({} {} on {}, {} {} on {})",
                opportunity.trade_quantity, quantity, opportunity.symbol,
                buy_balance, opportunity.buy_quote_currency, opportunity.buy_venue,
                sell_balance, opportunity.symbol, opportunity.sell_venue,
            );
        }
        Ok(quantity)
    }

    fn aborted(&self, opportunity: &Opportunity, start: Instant, reason: String) -> ExecutionResult {
        warn!("Execution of {} aborted before any order: {}", opportunity.id, reason);
        let mut buy = skipped_leg(&opportunity.buy_venue, Side::Buy);
        buy.error_message = Some(reason);
        self.finish(
            opportunity,
            start,
            buy,
            skipped_leg(&opportunity.sell_venue, Side::Sell),
            ExecutionStatus::Aborted,
        )
    }

    fn finish(
        &self,
        opportunity: &Opportunity,
        start: Instant,
        buy_outcome: LegOutcome,
        sell_outcome: LegOutcome,
        status: ExecutionStatus,
    ) -> ExecutionResult {
        let realized_profit_estimate = match status {
            ExecutionStatus::Completed => self.realized_profit(&buy_outcome, &sell_outcome),
            ExecutionStatus::Partial | ExecutionStatus::Aborted => Decimal::ZERO,
        };

        ExecutionResult {
            id: uuid::Uuid::new_v4().to_string(),
            opportunity_id: opportunity.id.clone(),
            timestamp: chrono::Utc::now(),
            mode: ExecutionMode::Live,
            buy_outcome,
            sell_outcome,
            realized_profit_estimate,
            status,
            execution_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Matched quantity at the fill prices, less both taker fees.
    fn realized_profit(&self, buy: &LegOutcome, sell: &LegOutcome) -> Decimal {
        let matched = buy.filled_quantity.min(sell.filled_quantity);
        let buy_notional = matched * buy.filled_price.unwrap_or_default();
        let sell_notional = matched * sell.filled_price.unwrap_or_default();
        let fees = buy_notional * self.fees.fee(&buy.venue) + sell_notional * self.fees.fee(&sell.venue);
        sell_notional - buy_notional - fees
    }
}

/// An accepted order that filled nothing counts as a failed leg.
fn require_fill(order: OrderResult, side: Side) -> Result<OrderResult, OrderError> {
    if order.filled_quantity > Decimal::ZERO {
        Ok(order)
    } else {
        Err(OrderError::Rejected(format!("{} order {} filled nothing", side, order.order_id)))
    }
}

/// Venues that do not report a fill price are assumed to fill at the quote.
fn filled_leg(venue: &VenueId, side: Side, order: &OrderResult, quoted_price: Decimal) -> LegOutcome {
    LegOutcome {
        venue: venue.clone(),
        side,
        status: LegStatus::Success,
        order_id: Some(order.order_id.clone()),
        filled_quantity: order.filled_quantity,
        filled_price: Some(order.average_price.unwrap_or(quoted_price)),
        error_message: None,
    }
}

fn failed_leg(venue: &VenueId, side: Side, error: &OrderError) -> LegOutcome {
    LegOutcome {
        venue: venue.clone(),
        side,
        status: LegStatus::Failed,
        order_id: None,
        filled_quantity: Decimal::ZERO,
        filled_price: None,
        error_message: Some(error.to_string()),
    }
}

fn skipped_leg(venue: &VenueId, side: Side) -> LegOutcome {
    LegOutcome {
        venue: venue.clone(),
        side,
        status: LegStatus::Skipped,
        order_id: None,
        filled_quantity: Decimal::ZERO,
        filled_price: None,
        error_message: None,
    }
}
