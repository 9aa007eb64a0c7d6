//! Per-venue taker fee schedule

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use super::VenueId;

/// Taker fee charged when a venue is not in the schedule (0.1%).
pub const DEFAULT_TAKER_FEE: Decimal = dec!(0.001);

#[derive(Debug, Clone, Default)]
pub struct FeeSchedule {
    rates: HashMap<VenueId, Decimal>,
}

impl FeeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, venue: impl Into<VenueId>, rate: Decimal) -> Self {
        self.rates.insert(venue.into(), rate);
        self
    }

    /// Taker fee as a fraction of notional.
    pub fn fee(&self, venue: &VenueId) -> Decimal {
        self.rates.get(venue).copied().unwrap_or(DEFAULT_TAKER_FEE)
    }
}

impl FromIterator<(VenueId, Decimal)> for FeeSchedule {
    fn from_iter<I: IntoIterator<Item = (VenueId, Decimal)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
