//! Binance.US REST client

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::prelude::*;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use crate::{
    config::VenueConfig,
    errors::{BotError, BotResult, OrderError, QuoteError},
    network::{build_http_client, hmac_sha256_hex, order_transport_error, quote_transport_error, retry_with_backoff, RetryConfig},
    types::{OrderResult, PriceQuote, Side, VenueId},
};
use super::VenueClient;

pub const BINANCE_US_BASE_URL: &str = "https://api.binance.us";
const RECV_WINDOW_MS: u64 = 5000;
const QUANTITY_DECIMALS: u32 = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    bid_price: String,
    ask_price: String,
    last_price: String,
    close_time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    order_id: i64,
    executed_qty: String,
    cummulative_quote_qty: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    balances: Vec<AssetBalance>,
}

#[derive(Debug, Deserialize)]
struct AssetBalance {
    asset: String,
    free: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

pub struct BinanceClient {
    id: VenueId,
    http: Client,
    base_url: String,
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl BinanceClient {
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
                .unwrap_or_else(|| BINANCE_US_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn pair(symbol: &str, quote_currency: &str) -> String {
        format!("{}{}", symbol.to_uppercase(), quote_currency.to_uppercase())
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        }
    }

    /// Appends `timestamp`, `recvWindow` and `signature` to a query string.
    fn signed_query(&self, params: &str, secret: &str) -> anyhow::Result<String> {
        let timestamp = Utc::now().timestamp_millis();
        let query = if params.is_empty() {
            format!("recvWindow={RECV_WINDOW_MS}&timestamp={timestamp}")
        } else {
            format!("{params}&recvWindow={RECV_WINDOW_MS}&timestamp={timestamp}")
        };
        let signature = hmac_sha256_hex(secret, &query)?;
        Ok(format!("{query}&signature={signature}"))
    }
}

fn parse_api_error(body: &str) -> Option<ApiError> {
    serde_json::from_str(body).ok()
}

fn is_auth_code(code: i64) -> bool {
    matches!(code, -2014 | -2015 | -1022)
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(value).ok()
}

/// Binance reports an empty side as `0.00000000`.
fn parse_price(value: &str) -> Option<Decimal> {
    parse_decimal(value).filter(|p| *p > Decimal::ZERO)
}

fn map_quote_status(status: StatusCode, body: &str) -> QuoteError {
    let api_error = parse_api_error(body);
    match (status, api_error) {
        (_, Some(err)) if err.code == -1121 => QuoteError::PairNotFound,
        (_, Some(err)) if is_auth_code(err.code) => QuoteError::AuthFailed,
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => QuoteError::AuthFailed,
        (StatusCode::TOO_MANY_REQUESTS | StatusCode::IM_A_TEAPOT, _) => QuoteError::RateLimited,
        (status, Some(err)) => QuoteError::Unknown(format!("{} {}: {}", status, err.code, err.msg)),
        (status, None) => QuoteError::Unknown(format!("{}: {}", status, body)),
    }
}

fn map_order_status(status: StatusCode, body: &str) -> OrderError {
    let api_error = parse_api_error(body);
    match (status, api_error) {
        (StatusCode::TOO_MANY_REQUESTS | StatusCode::IM_A_TEAPOT, _) => OrderError::RateLimited,
        (_, Some(err)) if err.code == -2010 && err.msg.to_lowercase().contains("insufficient balance") => {
            OrderError::InsufficientFunds
        }
        (_, Some(err)) if is_auth_code(err.code) => {
            OrderError::Rejected(format!("authentication failed: {}", err.msg))
        }
        (status, Some(err)) if status.is_client_error() => OrderError::Rejected(format!("{}: {}", err.code, err.msg)),
        (status, _) => OrderError::Unknown(format!("{}: {}", status, body)),
    }
}

#[async_trait]
impl VenueClient for BinanceClient {
    fn id(&self) -> &VenueId {
        &self.id
    }

    async fn connect(&self) -> BotResult<()> {
        let url = format!("{}/api/v3/ping", self.base_url);
        retry_with_backoff(
            || async {
                let response = self.http.get(&url).send().await?;
                if !response.status().is_success() {
                    return Err(anyhow::anyhow!("Binance ping returned {}", response.status()));
                }
                Ok(())
            },
            &RetryConfig::default(),
            "Binance.US connection",
        )
        .await?;

        info!("✅ Connected to Binance.US ({})", self.base_url);
        Ok(())
    }

    async fn fetch_quote(&self, symbol: &str, quote_currency: &str) -> Result<PriceQuote, QuoteError> {
        let pair = Self::pair(symbol, quote_currency);
        let response = self
            .http
            .get(format!("{}/api/v3/ticker/24hr", self.base_url))
            .query(&[("symbol", pair.as_str())])
            .send()
            .await
            .map_err(quote_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(quote_transport_error)?;
        if !status.is_success() {
            return Err(map_quote_status(status, &body));
        }

        let ticker: Ticker24h = serde_json::from_str(&body)
            .map_err(|e| QuoteError::Unknown(format!("Failed to parse ticker: {}", e)))?;

        debug!("binance {} bid={} ask={} last={}", pair, ticker.bid_price, ticker.ask_price, ticker.last_price);

        Ok(PriceQuote {
            venue: self.id.clone(),
            symbol: symbol.to_uppercase(),
            quote_currency: quote_currency.to_uppercase(),
            bid: parse_price(&ticker.bid_price),
            ask: parse_price(&ticker.ask_price),
            last: parse_price(&ticker.last_price),
            observed_at: Utc
                .timestamp_millis_opt(ticker.close_time)
                .single()
                .unwrap_or_else(Utc::now),
        })
    }

    async fn place_order(
        &self,
        symbol: &str,
        quote_currency: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResult, OrderError> {
        let (key, secret) = self
            .credentials()
            .ok_or_else(|| OrderError::Rejected("missing API credentials".to_string()))?;

        let quantity = quantity.round_dp_with_strategy(QUANTITY_DECIMALS, RoundingStrategy::ToZero);
        let params = format!(
            "symbol={}&side={}&type=MARKET&quantity={}",
            Self::pair(symbol, quote_currency),
            side.to_string().to_uppercase(),
            quantity.normalize()
        );
        let query = self
            .signed_query(&params, secret)
            .map_err(|e| OrderError::Unknown(e.to_string()))?;

        let response = self
            .http
            .post(format!("{}/api/v3/order?{}", self.base_url, query))
            .header("X-MBX-APIKEY", key)
            .send()
            .await
            .map_err(order_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(order_transport_error)?;
        if !status.is_success() {
            return Err(map_order_status(status, &body));
        }

        let order: OrderResponse = serde_json::from_str(&body)
            .map_err(|e| OrderError::Unknown(format!("Failed to parse order response: {}", e)))?;

        let filled_quantity = parse_decimal(&order.executed_qty).unwrap_or_default();
        // A market order that expired after a partial fill still holds inventory.
        if matches!(order.status.as_str(), "EXPIRED" | "REJECTED" | "CANCELED")
            && filled_quantity <= Decimal::ZERO
        {
            return Err(OrderError::Rejected(format!("order {} {}", order.order_id, order.status)));
        }
        let quote_filled = parse_decimal(&order.cummulative_quote_qty).unwrap_or_default();
        let average_price = (filled_quantity > Decimal::ZERO)
            .then(|| quote_filled.checked_div(filled_quantity))
            .flatten();

        info!("✓ Order placed on binance: {} {} {}", side, filled_quantity, symbol);

        Ok(OrderResult {
            order_id: order.order_id.to_string(),
            filled_quantity,
            average_price,
        })
    }

    async fn fetch_balance(&self, asset: &str) -> Result<Decimal, QuoteError> {
        let (key, secret) = self.credentials().ok_or(QuoteError::AuthFailed)?;
        let query = self
            .signed_query("", secret)
            .map_err(|e| QuoteError::Unknown(e.to_string()))?;

        let response = self
            .http
            .get(format!("{}/api/v3/account?{}", self.base_url, query))
            .header("X-MBX-APIKEY", key)
            .send()
            .await
            .map_err(quote_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(quote_transport_error)?;
        if !status.is_success() {
            return Err(map_quote_status(status, &body));
        }

        let account: AccountResponse = serde_json::from_str(&body)
            .map_err(|e| QuoteError::Unknown(format!("Failed to parse account: {}", e)))?;

        Ok(account
            .balances
            .iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
            .and_then(|b| parse_decimal(&b.free))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn client(server: &mockito::ServerGuard, with_keys: bool) -> BinanceClient {
        let config = VenueConfig {
            id: VenueId::new("binance"),
            fee_rate: dec!(0.001),
            api_key: with_keys.then(|| "key".to_string()),
            api_secret: with_keys.then(|| "secret".to_string()),
            base_url: Some(server.url()),
        };
        BinanceClient::new(&config, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn parses_ticker_into_quote() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v3/ticker/24hr")
            .match_query(mockito::Matcher::UrlEncoded("symbol".into(), "XLMUSDT".into()))
            .with_status(200)
            .with_body(r#"{"symbol":"XLMUSDT","bidPrice":"0.12450000","askPrice":"0.12480000","lastPrice":"0.12460000","closeTime":1700000000000}"#)
            .create_async()
            .await;

        let quote = client(&server, false).fetch_quote("xlm", "usdt").await.unwrap();
        mock.assert_async().await;

        assert_eq!(quote.venue, VenueId::new("binance"));
        assert_eq!(quote.symbol, "XLM");
        assert_eq!(quote.quote_currency, "USDT");
        assert_eq!(quote.bid, Some(dec!(0.1245)));
        assert_eq!(quote.ask, Some(dec!(0.1248)));
        assert_eq!(quote.last, Some(dec!(0.1246)));
        assert_eq!(quote.observed_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[tokio::test]
    async fn unknown_symbol_maps_to_pair_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/ticker/24hr")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#)
            .create_async()
            .await;

        let err = client(&server, false).fetch_quote("XLM", "USD").await.unwrap_err();
        assert_eq!(err, QuoteError::PairNotFound);
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/ticker/24hr")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_body(r#"{"code":-1003,"msg":"Too many requests."}"#)
            .create_async()
            .await;

        let err = client(&server, false).fetch_quote("XLM", "USDT").await.unwrap_err();
        assert_eq!(err, QuoteError::RateLimited);
    }

    #[tokio::test]
    async fn market_order_reports_fill() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v3/order")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("symbol".into(), "XLMUSDT".into()),
                mockito::Matcher::UrlEncoded("side".into(), "BUY".into()),
                mockito::Matcher::UrlEncoded("type".into(), "MARKET".into()),
                mockito::Matcher::UrlEncoded("quantity".into(), "800".into()),
            ]))
            .match_header("X-MBX-APIKEY", "key")
            .with_status(200)
            .with_body(r#"{"orderId":42,"executedQty":"800.00000000","cummulativeQuoteQty":"100.00000000","status":"FILLED"}"#)
            .create_async()
            .await;

        let result = client(&server, true)
            .place_order("XLM", "USDT", Side::Buy, dec!(800))
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(result.order_id, "42");
        assert_eq!(result.filled_quantity, dec!(800));
        assert_eq!(result.average_price, Some(dec!(0.125)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn slow_fill_within_order_timeout_is_not_a_timeout() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v3/order")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(1_500));
                w.write_all(br#"{"orderId":44,"executedQty":"800.00000000","cummulativeQuoteQty":"100.00000000","status":"FILLED"}"#)
            })
            .create_async()
            .await;

        let config = crate::config::Config {
            quote_timeout_ms: 1_000,
            order_timeout_ms: 5_000,
            ..Default::default()
        };
        let venue = VenueConfig {
            id: VenueId::new("binance"),
            fee_rate: dec!(0.001),
            api_key: Some("key".to_string()),
            api_secret: Some("secret".to_string()),
            base_url: Some(server.url()),
        };
        let client = BinanceClient::new(&venue, config.venue_timeout()).unwrap();

        let result = tokio::time::timeout(
            config.order_timeout(),
            client.place_order("XLM", "USDT", Side::Buy, dec!(800)),
        )
        .await
        .unwrap();
        assert_eq!(result.unwrap().filled_quantity, dec!(800));
    }

    #[tokio::test]
    async fn expired_order_without_fill_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v3/order")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"orderId":43,"executedQty":"0.00000000","cummulativeQuoteQty":"0.00000000","status":"EXPIRED"}"#)
            .create_async()
            .await;

        let err = client(&server, true)
            .place_order("XLM", "USDT", Side::Buy, dec!(800))
            .await
            .unwrap_err();
        assert_eq!(err, OrderError::Rejected("order 43 EXPIRED".to_string()));
    }

    #[tokio::test]
    async fn insufficient_balance_maps_to_insufficient_funds() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v3/order")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"code":-2010,"msg":"Account has insufficient balance for requested action."}"#)
            .create_async()
            .await;

        let err = client(&server, true)
            .place_order("XLM", "USDT", Side::Sell, dec!(10))
            .await
            .unwrap_err();
        assert_eq!(err, OrderError::InsufficientFunds);
    }

    #[tokio::test]
    async fn orders_without_credentials_are_rejected_locally() {
        let server = mockito::Server::new_async().await;
        let err = client(&server, false)
            .place_order("XLM", "USDT", Side::Buy, dec!(10))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Rejected(_)));
    }

    #[tokio::test]
    async fn reads_free_balance() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"balances":[{"asset":"XLM","free":"1500.5","locked":"0"},{"asset":"USDT","free":"250","locked":"0"}]}"#)
            .create_async()
            .await;

        let c = client(&server, true);
        assert_eq!(c.fetch_balance("USDT").await.unwrap(), dec!(250));
        assert_eq!(c.fetch_balance("BTC").await.unwrap(), Decimal::ZERO);
    }
}
