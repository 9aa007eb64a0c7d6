//! Scripted venue for integration testing.
//!
//! Quotes and order outcomes can be changed between cycles from test code;
//! every call is recorded.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cex_arb_bot::reporting::{CycleReport, ReportSink};
use cex_arb_bot::venues::{VenueClient, VenueMap};
use cex_arb_bot::*;

pub struct ScriptedVenue {
    id: VenueId,
    quotes: Mutex<HashMap<String, Result<(Decimal, Decimal), QuoteError>>>,
    sell_error: Mutex<Option<OrderError>>,
    orders: Mutex<Vec<(Side, String, Decimal)>>,
}

impl ScriptedVenue {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: VenueId::new(id),
            quotes: Mutex::new(HashMap::new()),
            sell_error: Mutex::new(None),
            orders: Mutex::new(Vec::new()),
        })
    }

    /// Quotes `symbol` in USD.
    pub fn set_quote(&self, symbol: &str, bid: Decimal, ask: Decimal) {
        self.quotes.lock().unwrap().insert(symbol.to_string(), Ok((bid, ask)));
    }

    pub fn fail_quote(&self, symbol: &str, error: QuoteError) {
        self.quotes.lock().unwrap().insert(symbol.to_string(), Err(error));
    }

    pub fn reject_sells(&self, reason: &str) {
        *self.sell_error.lock().unwrap() = Some(OrderError::Rejected(reason.to_string()));
    }

    pub fn orders(&self) -> Vec<(Side, String, Decimal)> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl VenueClient for ScriptedVenue {
    fn id(&self) -> &VenueId {
        &self.id
    }

    async fn connect(&self) -> BotResult<()> {
        Ok(())
    }

    async fn fetch_quote(&self, symbol: &str, quote_currency: &str) -> Result<PriceQuote, QuoteError> {
        if quote_currency != "USD" {
            return Err(QuoteError::PairNotFound);
        }
        let (bid, ask) = self
            .quotes
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or(Err(QuoteError::PairNotFound))?;
        Ok(PriceQuote {
            venue: self.id.clone(),
            symbol: symbol.to_string(),
            quote_currency: quote_currency.to_string(),
            bid: Some(bid),
            ask: Some(ask),
            last: None,
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
        self.orders.lock().unwrap().push((side, symbol.to_string(), quantity));
        if side == Side::Sell {
            if let Some(error) = self.sell_error.lock().unwrap().clone() {
                return Err(error);
            }
        }
        Ok(OrderResult {
            order_id: format!("{}-{}", self.id, self.orders.lock().unwrap().len()),
            filled_quantity: quantity,
            average_price: None,
        })
    }

    async fn fetch_balance(&self, _asset: &str) -> Result<Decimal, QuoteError> {
        Ok(Decimal::ZERO)
    }
}

/// Collects every report handed to it.
#[derive(Clone, Default)]
pub struct CollectingSink {
    pub reports: Arc<Mutex<Vec<CycleReport>>>,
    pub finished: Arc<Mutex<Vec<Statistics>>>,
}

impl ReportSink for CollectingSink {
    fn report(&mut self, report: &CycleReport) -> anyhow::Result<()> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }

    fn finish(&mut self, statistics: &Statistics) -> anyhow::Result<()> {
        self.finished.lock().unwrap().push(statistics.clone());
        Ok(())
    }
}

pub fn venue_map(venues: &[Arc<ScriptedVenue>]) -> VenueMap {
    venues
        .iter()
        .map(|v| (v.id().clone(), v.clone() as Arc<dyn VenueClient>))
        .collect()
}

pub fn config(symbols: &[&str], mode: ExecutionMode, venues: &[&str]) -> Config {
    Config {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        quote_currencies: vec!["USDT".into(), "USD".into()],
        venues: venues
            .iter()
            .map(|id| VenueConfig {
                id: VenueId::new(id),
                fee_rate: rust_decimal_macros::dec!(0.001),
                api_key: Some("key".into()),
                api_secret: Some("secret".into()),
                base_url: None,
            })
            .collect(),
        min_profit_pct: rust_decimal_macros::dec!(0.005),
        trade_amount_usd: rust_decimal_macros::dec!(100),
        mode,
        quote_timeout_ms: 200,
        order_timeout_ms: 200,
        ..Config::default()
    }
}
