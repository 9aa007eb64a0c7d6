//! Process-wide running statistics

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;
use crate::types::{ExecutionMode, ExecutionResult, ExecutionStatus};

/// What one cycle contributes to the running totals.
#[derive(Debug, Clone, Default)]
pub struct CycleDelta {
    pub opportunities_found: u64,
    pub quote_failures: u64,
    pub dispatch: Option<ExecutionResult>,
}

/// Running counters, zeroed at startup and only ever incremented.
///
/// The execution cycle is the single writer. Everyone else reads a
/// [`Statistics::snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub started_at: DateTime<Utc>,
    pub cycles_run: u64,
    pub opportunities_found: u64,
    /// Completed dispatches only; partial and aborted ones are counted apart.
    pub trades_executed: u64,
    pub simulated_trades: u64,
    pub live_trades: u64,
    pub partial_executions: u64,
    pub aborted_executions: u64,
    pub quote_failures: u64,
    pub cumulative_estimated_profit_usd: Decimal,
    pub unhedged_exposure_usd: Decimal,
}

impl Statistics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            cycles_run: 0,
            opportunities_found: 0,
            trades_executed: 0,
            simulated_trades: 0,
            live_trades: 0,
            partial_executions: 0,
            aborted_executions: 0,
            quote_failures: 0,
            cumulative_estimated_profit_usd: Decimal::ZERO,
            unhedged_exposure_usd: Decimal::ZERO,
        }
    }

    pub(crate) fn record(&mut self, delta: &CycleDelta) {
        self.cycles_run += 1;
        self.opportunities_found += delta.opportunities_found;
        self.quote_failures += delta.quote_failures;

        let Some(execution) = &delta.dispatch else {
            return;
        };
        match execution.status {
            ExecutionStatus::Completed => {
                self.trades_executed += 1;
                match execution.mode {
                    ExecutionMode::Simulated => self.simulated_trades += 1,
                    ExecutionMode::Live => self.live_trades += 1,
                }
                self.cumulative_estimated_profit_usd += execution.realized_profit_estimate;
            }
            ExecutionStatus::Partial => {
                self.partial_executions += 1;
                self.unhedged_exposure_usd += execution.unhedged_exposure();
            }
            ExecutionStatus::Aborted => self.aborted_executions += 1,
        }
    }

    pub fn snapshot(&self) -> Statistics {
        self.clone()
    }

    /// Completed trades per opportunity found, in percent.
    pub fn success_rate(&self) -> Decimal {
        let found = Decimal::from(self.opportunities_found.max(1));
        Decimal::from(self.trades_executed) / found * dec!(100)
    }

    pub fn runtime_minutes(&self) -> i64 {
        (Utc::now() - self.started_at).num_minutes()
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LegOutcome, LegStatus, Side, VenueId};

    fn leg(venue: &str, side: Side, status: LegStatus, qty: Decimal, price: Option<Decimal>) -> LegOutcome {
        LegOutcome {
            venue: VenueId::new(venue),
            side,
            status,
            order_id: None,
            filled_quantity: qty,
            filled_price: price,
            error_message: None,
        }
    }

    fn execution(mode: ExecutionMode, status: ExecutionStatus, profit: Decimal) -> ExecutionResult {
        let sell_status = match status {
            ExecutionStatus::Completed => LegStatus::Success,
            ExecutionStatus::Partial => LegStatus::Failed,
            ExecutionStatus::Aborted => LegStatus::Skipped,
        };
        ExecutionResult {
            id: "e".into(),
            opportunity_id: "o".into(),
            timestamp: Utc::now(),
            mode,
            buy_outcome: leg("a", Side::Buy, LegStatus::Success, dec!(800), Some(dec!(0.125))),
            sell_outcome: leg("b", Side::Sell, sell_status, Decimal::ZERO, None),
            realized_profit_estimate: profit,
            status,
            execution_time_ms: 1,
        }
    }

    #[test]
    fn totals_are_the_sum_of_cycle_deltas() {
        let deltas = vec![
            CycleDelta { opportunities_found: 2, quote_failures: 1, dispatch: Some(execution(ExecutionMode::Simulated, ExecutionStatus::Completed, dec!(0.76))) },
            CycleDelta::default(),
            CycleDelta { opportunities_found: 1, quote_failures: 0, dispatch: Some(execution(ExecutionMode::Live, ExecutionStatus::Completed, dec!(0.5))) },
            CycleDelta { opportunities_found: 3, quote_failures: 4, dispatch: Some(execution(ExecutionMode::Live, ExecutionStatus::Aborted, Decimal::ZERO)) },
        ];

        let mut stats = Statistics::new();
        let mut previous = stats.snapshot();
        for delta in &deltas {
            stats.record(delta);
            assert!(stats.cycles_run > previous.cycles_run);
            assert!(stats.opportunities_found >= previous.opportunities_found);
            assert!(stats.trades_executed >= previous.trades_executed);
            assert!(stats.cumulative_estimated_profit_usd >= previous.cumulative_estimated_profit_usd);
            previous = stats.snapshot();
        }

        assert_eq!(stats.cycles_run, 4);
        assert_eq!(stats.opportunities_found, 6);
        assert_eq!(stats.quote_failures, 5);
        assert_eq!(stats.trades_executed, 2);
        assert_eq!(stats.simulated_trades, 1);
        assert_eq!(stats.live_trades, 1);
        assert_eq!(stats.aborted_executions, 1);
        assert_eq!(stats.cumulative_estimated_profit_usd, dec!(1.26));
    }

    #[test]
    fn partial_execution_is_not_a_trade_but_flags_exposure() {
        let mut stats = Statistics::new();
        stats.record(&CycleDelta {
            opportunities_found: 1,
            quote_failures: 0,
            dispatch: Some(execution(ExecutionMode::Live, ExecutionStatus::Partial, Decimal::ZERO)),
        });

        assert_eq!(stats.trades_executed, 0);
        assert_eq!(stats.partial_executions, 1);
        assert_eq!(stats.unhedged_exposure_usd, dec!(100));
        assert_eq!(stats.cumulative_estimated_profit_usd, Decimal::ZERO);
    }

    #[test]
    fn success_rate_guards_against_no_opportunities() {
        let mut stats = Statistics::new();
        assert_eq!(stats.success_rate(), Decimal::ZERO);

        stats.record(&CycleDelta {
            opportunities_found: 4,
            quote_failures: 0,
            dispatch: Some(execution(ExecutionMode::Simulated, ExecutionStatus::Completed, dec!(1))),
        });
        assert_eq!(stats.success_rate(), dec!(25));
    }
}
