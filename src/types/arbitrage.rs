//! Arbitrage opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use super::VenueId;

/// A directional buy-on-one-venue, sell-on-another candidate whose
/// fee-adjusted profit cleared the configured minimum when it was built.
///
/// Percentages are stored as fractions (`0.0076` is 0.76%).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub id: String,
    pub detected_at: DateTime<Utc>,
    pub symbol: String,
    /// Quote currency the buy venue prices the symbol in.
    pub buy_quote_currency: String,
    /// Quote currency the sell venue prices the symbol in.
    pub sell_quote_currency: String,
    pub buy_venue: VenueId,
    pub sell_venue: VenueId,
    /// Ask on the buy venue.
    pub buy_price: Decimal,
    /// Bid on the sell venue.
    pub sell_price: Decimal,
    pub gross_profit_pct: Decimal,
    pub net_profit_pct: Decimal,
    pub trade_quantity: Decimal,
    pub estimated_profit_usd: Decimal,
}

impl fmt::Display for Opportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Buy {} on {} at {:.6}, sell on {} at {:.6} | Net: {:.3}% (~${:.2})",
            self.symbol,
            self.buy_venue,
            self.buy_price,
            self.sell_venue,
            self.sell_price,
            crate::utils::to_percent(self.net_profit_pct),
            self.estimated_profit_usd,
        )
    }
}
