//! In-memory venue used by unit tests

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use crate::{
    errors::{BotResult, OrderError, QuoteError},
    types::{OrderResult, PriceQuote, Side, VenueId},
};
use super::VenueClient;

pub struct MockVenue {
    id: VenueId,
    quotes: HashMap<(String, String), Result<(Decimal, Decimal), QuoteError>>,
    order_results: HashMap<Side, Result<OrderResult, OrderError>>,
    balances: HashMap<String, Decimal>,
    quote_delay: Option<Duration>,
    order_delay: Option<Duration>,
    pub orders: Mutex<Vec<(Side, String, Decimal)>>,
    pub quote_requests: Mutex<Vec<(String, String)>>,
}

impl MockVenue {
    pub fn new(id: &str) -> Self {
        Self {
            id: VenueId::new(id),
            quotes: HashMap::new(),
            order_results: HashMap::new(),
            balances: HashMap::new(),
            quote_delay: None,
            order_delay: None,
            orders: Mutex::new(Vec::new()),
            quote_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_quote(mut self, symbol: &str, quote_currency: &str, bid: Decimal, ask: Decimal) -> Self {
        self.quotes
            .insert((symbol.into(), quote_currency.into()), Ok((bid, ask)));
        self
    }

    pub fn with_quote_error(mut self, symbol: &str, quote_currency: &str, error: QuoteError) -> Self {
        self.quotes.insert((symbol.into(), quote_currency.into()), Err(error));
        self
    }

    pub fn with_order_result(mut self, side: Side, result: Result<OrderResult, OrderError>) -> Self {
        self.order_results.insert(side, result);
        self
    }

    pub fn with_balance(mut self, asset: &str, amount: Decimal) -> Self {
        self.balances.insert(asset.into(), amount);
        self
    }

    pub fn with_quote_delay(mut self, delay: Duration) -> Self {
        self.quote_delay = Some(delay);
        self
    }

    pub fn with_order_delay(mut self, delay: Duration) -> Self {
        self.order_delay = Some(delay);
        self
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

#[async_trait]
impl VenueClient for MockVenue {
    fn id(&self) -> &VenueId {
        &self.id
    }

    async fn connect(&self) -> BotResult<()> {
        Ok(())
    }

    async fn fetch_quote(&self, symbol: &str, quote_currency: &str) -> Result<PriceQuote, QuoteError> {
        self.quote_requests
            .lock()
            .unwrap()
            .push((symbol.to_string(), quote_currency.to_string()));
        if let Some(delay) = self.quote_delay {
            tokio::time::sleep(delay).await;
        }
        let (bid, ask) = self
            .quotes
            .get(&(symbol.to_string(), quote_currency.to_string()))
            .cloned()
            .unwrap_or(Err(QuoteError::PairNotFound))?;
        Ok(PriceQuote {
            venue: self.id.clone(),
            symbol: symbol.to_string(),
            quote_currency: quote_currency.to_string(),
            bid: Some(bid),
            ask: Some(ask),
            last: Some(bid),
            observed_at: Utc::now(),
        })
    }

    async fn place_order(
        &self,
        symbol: &str,
        _quote_currency: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResult, OrderError> {
        self.orders
            .lock()
            .unwrap()
            .push((side, symbol.to_string(), quantity));
        if let Some(delay) = self.order_delay {
            tokio::time::sleep(delay).await;
        }
        self.order_results.get(&side).cloned().unwrap_or_else(|| {
            Ok(OrderResult {
                order_id: format!("{}-{}", self.id, side),
                filled_quantity: quantity,
                average_price: None,
            })
        })
    }

    async fn fetch_balance(&self, asset: &str) -> Result<Decimal, QuoteError> {
        Ok(self.balances.get(asset).copied().unwrap_or_default())
    }
}
