//! Kraken REST client

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use rust_decimal::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use crate::{
    config::VenueConfig,
    errors::{BotError, BotResult, OrderError, QuoteError},
    network::{build_http_client, kraken_signature, order_transport_error, quote_transport_error, retry_with_backoff, RetryConfig},
    types::{OrderResult, PriceQuote, Side, VenueId},
};
use super::VenueClient;

pub const KRAKEN_BASE_URL: &str = "https://api.kraken.com";
const QUANTITY_DECIMALS: u32 = 8;

/// Every Kraken response is wrapped in `{"error": [...], "result": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: Vec<String>,
    result: Option<T>,
}

/// Ticker entry: `a`/`b` are `[price, whole lot volume, lot volume]`,
/// `c` is `[price, lot volume]` of the last trade.
#[derive(Debug, Deserialize)]
struct TickerEntry {
    a: Vec<String>,
    b: Vec<String>,
    c: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AddOrderResult {
    txid: Vec<String>,
}

pub struct KrakenClient {
    id: VenueId,
    http: Client,
    base_url: String,
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl KrakenClient {
    pub fn new(config: &VenueConfig, timeout: Duration) -> BotResult<Self> {
        let http = build_http_client(timeout).map_err(|e| BotError::Network {
            message: "Failed to build HTTP client".to_string(),
            source: Some(e.into()),
            retry_count: 0,
        })?;

        Ok(Self {
            id: config.id.clone(),
            http,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| KRAKEN_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn pair(symbol: &str, quote_currency: &str) -> String {
        format!("{}{}", symbol.to_uppercase(), quote_currency.to_uppercase())
    }

    /// Signed POST to a private endpoint; returns status and raw body.
    async fn private_post(&self, path: &str, params: &str) -> anyhow::Result<(StatusCode, String)> {
        let (key, secret) = match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => (key, secret),
            _ => return Err(anyhow::anyhow!("missing API credentials")),
        };

        let nonce = Utc::now().timestamp_millis().to_string();
        let body = if params.is_empty() {
            format!("nonce={nonce}")
        } else {
            format!("nonce={nonce}&{params}")
        };
        let signature = kraken_signature(path, &nonce, &body, secret)?;

        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("API-Key", key)
            .header("API-Sign", signature)
            .header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        Ok((status, response.text().await?))
    }
}

fn first_price(values: &[String]) -> Option<Decimal> {
    values
        .first()
        .and_then(|v| Decimal::from_str(v).ok())
        .filter(|p| *p > Decimal::ZERO)
}

fn map_quote_errors(errors: &[String]) -> QuoteError {
    let joined = errors.join(", ");
    if joined.contains("Unknown asset pair") {
        QuoteError::PairNotFound
    } else if joined.contains("Invalid key") || joined.contains("Invalid signature") || joined.contains("Permission denied") {
        QuoteError::AuthFailed
    } else if joined.contains("Rate limit") || joined.contains("Too many requests") {
        QuoteError::RateLimited
    } else {
        QuoteError::Unknown(joined)
    }
}

fn map_order_errors(errors: &[String]) -> OrderError {
    let joined = errors.join(", ");
    if joined.contains("Insufficient funds") {
        OrderError::InsufficientFunds
    } else if joined.contains("Rate limit") || joined.contains("Too many requests") {
        OrderError::RateLimited
    } else if joined.starts_with("EService") || joined.starts_with("EGeneral:Internal") {
        OrderError::Unknown(joined)
    } else {
        OrderError::Rejected(joined)
    }
}

/// Kraken prefixes legacy asset codes (`XXLM`, `ZUSD`).
fn balance_for(balances: &HashMap<String, String>, asset: &str) -> Decimal {
    let asset = asset.to_uppercase();
    [asset.clone(), format!("X{asset}"), format!("Z{asset}")]
        .iter()
        .find_map(|key| balances.get(key))
        .and_then(|v| Decimal::from_str(v).ok())
        .unwrap_or_default()
}

#[async_trait]
impl VenueClient for KrakenClient {
    fn id(&self) -> &VenueId {
        &self.id
    }

    async fn connect(&self) -> BotResult<()> {
        let url = format!("{}/0/public/Time", self.base_url);
        retry_with_backoff(
            || async {
                let response = self.http.get(&url).send().await?;
                let envelope: Envelope<Value> = response.json().await?;
                if !envelope.error.is_empty() {
                    return Err(anyhow::anyhow!("Kraken time endpoint: {}", envelope.error.join(", ")));
                }
                Ok(())
            },
            &RetryConfig::default(),
            "Kraken connection",
        )
        .await?;

        info!("✅ Connected to Kraken ({})", self.base_url);
        Ok(())
    }

    async fn fetch_quote(&self, symbol: &str, quote_currency: &str) -> Result<PriceQuote, QuoteError> {
        let pair = Self::pair(symbol, quote_currency);
        let response = self
            .http
            .get(format!("{}/0/public/Ticker", self.base_url))
            .query(&[("pair", pair.as_str())])
            .send()
            .await
            .map_err(quote_transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(QuoteError::RateLimited);
        }
        let body = response.text().await.map_err(quote_transport_error)?;
        if !status.is_success() {
            return Err(QuoteError::Unknown(format!("{}: {}", status, body)));
        }

        let envelope: Envelope<HashMap<String, TickerEntry>> = serde_json::from_str(&body)
            .map_err(|e| QuoteError::Unknown(format!("Failed to parse ticker: {}", e)))?;
        if !envelope.error.is_empty() {
            return Err(map_quote_errors(&envelope.error));
        }

        // Keyed by Kraken's own pair name (XXLMZUSD), one entry per request.
        let ticker = envelope
            .result
            .and_then(|result| result.into_values().next())
            .ok_or(QuoteError::PairNotFound)?;

        debug!("kraken {} bid={:?} ask={:?} last={:?}", pair, ticker.b.first(), ticker.a.first(), ticker.c.first());

        Ok(PriceQuote {
            venue: self.id.clone(),
            symbol: symbol.to_uppercase(),
            quote_currency: quote_currency.to_uppercase(),
            bid: first_price(&ticker.b),
            ask: first_price(&ticker.a),
            last: first_price(&ticker.c),
            observed_at: Utc::now(),
        })
    }

    async fn place_order(
        &self,
        symbol: &str,
        quote_currency: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResult, OrderError> {
        let quantity = quantity.round_dp_with_strategy(QUANTITY_DECIMALS, RoundingStrategy::ToZero);
        let params = format!(
            "ordertype=market&pair={}&type={}&volume={}",
            Self::pair(symbol, quote_currency),
            side,
            quantity.normalize()
        );

        let (status, body) = self
            .private_post("/0/private/AddOrder", &params)
            .await
            .map_err(|e| match e.downcast::<reqwest::Error>() {
                Ok(re) => order_transport_error(re),
                Err(e) => OrderError::Rejected(e.to_string()),
            })?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(OrderError::RateLimited);
        }
        if !status.is_success() {
            return Err(OrderError::Unknown(format!("{}: {}", status, body)));
        }

        let envelope: Envelope<AddOrderResult> = serde_json::from_str(&body)
            .map_err(|e| OrderError::Unknown(format!("Failed to parse order response: {}", e)))?;
        if !envelope.error.is_empty() {
            return Err(map_order_errors(&envelope.error));
        }

        let order_id = envelope
            .result
            .and_then(|r| r.txid.into_iter().next())
            .ok_or_else(|| OrderError::Unknown("order response without txid".to_string()))?;

        info!("✓ Order placed on kraken: {} {} {}", side, quantity, symbol);

        // AddOrder does not report fills; a market order is taken as filled in full.
        Ok(OrderResult {
            order_id,
            filled_quantity: quantity,
            average_price: None,
        })
    }

    async fn fetch_balance(&self, asset: &str) -> Result<Decimal, QuoteError> {
        let (status, body) = self
            .private_post("/0/private/Balance", "")
            .await
            .map_err(|e| match e.downcast::<reqwest::Error>() {
                Ok(re) => quote_transport_error(re),
                Err(e) => QuoteError::Unknown(e.to_string()),
            })?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(QuoteError::RateLimited);
        }
        let envelope: Envelope<HashMap<String, String>> = serde_json::from_str(&body)
            .map_err(|e| QuoteError::Unknown(format!("{}: failed to parse balance: {}", status, e)))?;
        if !envelope.error.is_empty() {
            return Err(map_quote_errors(&envelope.error));
        }

        Ok(envelope
            .result
            .map(|balances| balance_for(&balances, asset))
            .unwrap_or_default())
    }
}
