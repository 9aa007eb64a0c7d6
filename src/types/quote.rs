//! Venue identifiers and price quotes

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a trading venue, lower-cased (`binance`, `kraken`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VenueId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

/// Snapshot of one venue's top of book for a symbol.
///
/// Quotes are created fresh on every poll and dropped at the end of the
/// cycle that fetched them. A quote missing bid or ask never reaches the
/// detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub venue: VenueId,
    pub symbol: String,
    pub quote_currency: String,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub last: Option<Decimal>,
    pub observed_at: DateTime<Utc>,
}

impl PriceQuote {
    /// Trading pair in `BASE/QUOTE` form.
    pub fn pair(&self) -> String {
        format!("{}/{}", self.symbol, self.quote_currency)
    }
}
