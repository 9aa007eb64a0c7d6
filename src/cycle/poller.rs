//! Concurrent quote polling

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use crate::{
    errors::QuoteError,
    types::{PriceQuote, VenueId},
    venues::VenueClient,
};

/// Result of asking one venue for one symbol.
#[derive(Debug)]
pub struct PollResult {
    pub venue: VenueId,
    pub symbol: String,
    pub result: Result<PriceQuote, QuoteError>,
}

/// Fetches every (symbol, venue) combination concurrently and waits for
/// all of them. Each request is bounded by `timeout`, so a stalled venue
/// only costs its own slot.
pub async fn poll_quotes(
    venues: &[Arc<dyn VenueClient>],
    symbols: &[String],
    quote_currencies: &[String],
    timeout: Duration,
) -> Vec<PollResult> {
    let requests = symbols.iter().flat_map(|symbol| {
        venues.iter().map(move |venue| async move {
            PollResult {
                venue: venue.id().clone(),
                symbol: symbol.clone(),
                result: fetch_with_fallback(venue.as_ref(), symbol, quote_currencies, timeout).await,
            }
        })
    });

    join_all(requests).await
}

/// Tries each quote currency in order. Only an unknown pair moves on to the
/// next currency; any other failure ends the attempt.
pub async fn fetch_with_fallback(
    venue: &dyn VenueClient,
    symbol: &str,
    quote_currencies: &[String],
    timeout: Duration,
) -> Result<PriceQuote, QuoteError> {
    for quote_currency in quote_currencies {
        let attempt = tokio::time::timeout(timeout, venue.fetch_quote(symbol, quote_currency))
            .await
            .unwrap_or(Err(QuoteError::Timeout));

        match attempt {
            Err(QuoteError::PairNotFound) => continue,
            other => return other,
        }
    }
    Err(QuoteError::PairNotFound)
}
