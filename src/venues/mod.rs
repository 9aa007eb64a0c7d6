//! Venue connectivity.
//!
//! Defines the `VenueClient` trait the execution cycle talks to and
//! provides REST implementations for:
//! - Binance.US
//! - Kraken

pub mod binance;
pub mod kraken;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub use binance::BinanceClient;
pub use kraken::KrakenClient;

use crate::{
    config::VenueConfig,
    errors::{BotError, BotResult, OrderError, QuoteError},
    types::{OrderResult, PriceQuote, Side, VenueId},
};

/// Abstraction over a spot trading venue.
///
/// Implementors do not apply their own retry policy; the caller bounds every
/// call with a timeout and decides what a failure means for the cycle.
#[async_trait]
pub trait VenueClient: Send + Sync {
    fn id(&self) -> &VenueId;

    /// Startup connectivity check.
    async fn connect(&self) -> BotResult<()>;

    /// Current bid/ask/last for `symbol` priced in `quote_currency`.
    async fn fetch_quote(&self, symbol: &str, quote_currency: &str) -> Result<PriceQuote, QuoteError>;

    /// Market order for `quantity` units of `symbol`.
    async fn place_order(
        &self,
        symbol: &str,
        quote_currency: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResult, OrderError>;

    /// Free balance of `asset`.
    async fn fetch_balance(&self, asset: &str) -> Result<Decimal, QuoteError>;
}

/// Connected venues keyed by id.
pub type VenueMap = BTreeMap<VenueId, Arc<dyn VenueClient>>;

/// Builds the REST client for a configured venue.
pub fn build_venue(config: &VenueConfig, timeout: Duration) -> BotResult<Arc<dyn VenueClient>> {
    match config.id.as_str() {
        "binance" | "binanceus" => Ok(Arc::new(BinanceClient::new(config, timeout)?)),
        "kraken" => Ok(Arc::new(KrakenClient::new(config, timeout)?)),
        other => Err(BotError::Config(format!("Unsupported venue: {}", other))),
    }
}
