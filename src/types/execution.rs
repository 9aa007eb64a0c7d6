//! Trade execution types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use super::{Side, VenueId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Simulated,
    Live,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Simulated => f.write_str("SIMULATED"),
            ExecutionMode::Live => f.write_str("LIVE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Both legs filled.
    Completed,
    /// Buy leg filled, sell leg failed: unhedged inventory.
    Partial,
    /// Nothing was left open; the buy leg failed or was never sent.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegStatus {
    Success,
    Failed,
    /// Not attempted because an earlier step failed.
    Skipped,
}

/// What a venue reported back for a placed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderResult {
    pub order_id: String,
    pub filled_quantity: Decimal,
    /// Average fill price when the venue reports it.
    pub average_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegOutcome {
    pub venue: VenueId,
    pub side: Side,
    pub status: LegStatus,
    pub order_id: Option<String>,
    pub filled_quantity: Decimal,
    pub filled_price: Option<Decimal>,
    pub error_message: Option<String>,
}

impl LegOutcome {
    pub fn is_success(&self) -> bool {
        self.status == LegStatus::Success
    }
}

/// Outcome of dispatching one opportunity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub id: String,
    pub opportunity_id: String,
    pub timestamp: DateTime<Utc>,
    pub mode: ExecutionMode,
    pub buy_outcome: LegOutcome,
    pub sell_outcome: LegOutcome,
    pub realized_profit_estimate: Decimal,
    pub status: ExecutionStatus,
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    /// Quote-currency notional left unhedged by a partial execution.
    pub fn unhedged_exposure(&self) -> Decimal {
        if self.status != ExecutionStatus::Partial {
            return Decimal::ZERO;
        }
        self.buy_outcome.filled_price.unwrap_or_default() * self.buy_outcome.filled_quantity
    }
}
