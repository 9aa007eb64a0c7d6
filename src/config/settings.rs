//! Bot configuration settings and environment variable handling

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use crate::{
    errors::{BotError, BotResult},
    types::{ExecutionMode, FeeSchedule, VenueId, DEFAULT_TAKER_FEE},
    utils::from_percent,
};

// Configuration constants
pub const MIN_TRADE_AMOUNT_USD: Decimal = dec!(1);
pub const MAX_TRADE_AMOUNT_USD: Decimal = dec!(100000);
pub const MAX_FEE_RATE: Decimal = dec!(0.05);
pub const MIN_CHECK_INTERVAL_SECS: u64 = 1;

// Request timeouts
pub const DEFAULT_QUOTE_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_ORDER_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct VenueConfig {
    pub id: VenueId,
    /// Taker fee as a fraction (0.001 = 0.1%).
    pub fee_rate: Decimal,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Overrides the venue's public REST endpoint.
    pub base_url: Option<String>,
}

impl VenueConfig {
    pub fn has_credentials(&self) -> bool {
        matches!(
            (&self.api_key, &self.api_secret),
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty()
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub symbols: Vec<String>,
    /// Tried in order per venue until one is listed.
    pub quote_currencies: Vec<String>,
    pub venues: Vec<VenueConfig>,
    /// Minimum net profit as a fraction (0.005 = 0.5%).
    pub min_profit_pct: Decimal,
    pub trade_amount_usd: Decimal,
    pub check_interval_seconds: u64,
    pub mode: ExecutionMode,
    pub quote_timeout_ms: u64,
    pub order_timeout_ms: u64,
    pub max_consecutive_errors: u32,
    pub circuit_breaker_cooldown_secs: u64,
    pub size_by_balance: bool,
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: vec!["XLM".to_string()],
            quote_currencies: vec!["USDT".to_string(), "USD".to_string()],
            venues: ["binance", "kraken"]
                .iter()
                .map(|id| VenueConfig {
                    id: VenueId::new(id),
                    fee_rate: DEFAULT_TAKER_FEE,
                    api_key: None,
                    api_secret: None,
                    base_url: None,
                })
                .collect(),
            min_profit_pct: dec!(0.005),
            trade_amount_usd: dec!(100),
            check_interval_seconds: 5,
            mode: ExecutionMode::Simulated,
            quote_timeout_ms: DEFAULT_QUOTE_TIMEOUT_MS,
            order_timeout_ms: DEFAULT_ORDER_TIMEOUT_MS,
            max_consecutive_errors: 5,
            circuit_breaker_cooldown_secs: 300, // 5 minutes
            size_by_balance: false,
            output_dir: "output".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let defaults = Self::default();

        let venues = env_list("VENUES")
            .unwrap_or_else(|| defaults.venues.iter().map(|v| v.id.to_string()).collect())
            .iter()
            .map(|id| load_venue(VenueId::new(id)))
            .collect();

        Self {
            symbols: env_list("SYMBOLS")
                .map(|list| list.into_iter().map(|s| s.to_uppercase()).collect())
                .unwrap_or(defaults.symbols),
            quote_currencies: env_list("QUOTE_CURRENCIES")
                .map(|list| list.into_iter().map(|s| s.to_uppercase()).collect())
                .unwrap_or(defaults.quote_currencies),
            venues,
            // Expressed in percent in the environment, like the fee banner.
            min_profit_pct: env_decimal("MIN_PROFIT_PERCENTAGE")
                .map(from_percent)
                .unwrap_or(defaults.min_profit_pct),
            trade_amount_usd: env_decimal("TRADE_AMOUNT_USD")
                .unwrap_or(defaults.trade_amount_usd),
            check_interval_seconds: env_parse("CHECK_INTERVAL_SECONDS")
                .unwrap_or(defaults.check_interval_seconds)
                .max(MIN_CHECK_INTERVAL_SECS),
            mode: if env::var("DRY_RUN")
                .unwrap_or_else(|_| "true".to_string())
                .trim()
                .eq_ignore_ascii_case("true")
            {
                ExecutionMode::Simulated
            } else {
                ExecutionMode::Live
            },
            quote_timeout_ms: env_parse("QUOTE_TIMEOUT_MS").unwrap_or(defaults.quote_timeout_ms),
            order_timeout_ms: env_parse("ORDER_TIMEOUT_MS").unwrap_or(defaults.order_timeout_ms),
            max_consecutive_errors: env_parse("MAX_CONSECUTIVE_ERRORS")
                .unwrap_or(defaults.max_consecutive_errors),
            circuit_breaker_cooldown_secs: env_parse("CIRCUIT_BREAKER_COOLDOWN_SECS")
                .unwrap_or(defaults.circuit_breaker_cooldown_secs),
            size_by_balance: env_parse("SIZE_BY_BALANCE").unwrap_or(defaults.size_by_balance),
            output_dir: env::var("OUTPUT_DIR").unwrap_or(defaults.output_dir),
        }
    }

    pub fn validate(&self) -> BotResult<()> {
        if self.symbols.is_empty() {
            return Err(BotError::Config("at least one symbol is required".into()));
        }
        if self.quote_currencies.is_empty() {
            return Err(BotError::Config("at least one quote currency is required".into()));
        }
        if self.venues.len() < 2 {
            return Err(BotError::Config(format!(
                "at least 2 venues are required, got {}",
                self.venues.len()
            )));
        }
        if self.min_profit_pct < Decimal::ZERO {
            return Err(BotError::Config("MIN_PROFIT_PERCENTAGE must be positive".into()));
        }
        if self.trade_amount_usd <= Decimal::ZERO {
            return Err(BotError::Config("TRADE_AMOUNT_USD must be positive".into()));
        }
        if self.trade_amount_usd < MIN_TRADE_AMOUNT_USD || self.trade_amount_usd > MAX_TRADE_AMOUNT_USD {
            return Err(BotError::Config(format!(
                "TRADE_AMOUNT_USD out of bounds: {} (allowed {}..={})",
                self.trade_amount_usd, MIN_TRADE_AMOUNT_USD, MAX_TRADE_AMOUNT_USD
            )));
        }
        if self.check_interval_seconds == 0 {
            return Err(BotError::Config("CHECK_INTERVAL_SECONDS must be positive".into()));
        }
        for venue in &self.venues {
            if venue.fee_rate < Decimal::ZERO || venue.fee_rate > MAX_FEE_RATE {
                return Err(BotError::Config(format!(
                    "{} fee rate {} outside 0..={}",
                    venue.id, venue.fee_rate, MAX_FEE_RATE
                )));
            }
            if self.mode == ExecutionMode::Live && !venue.has_credentials() {
                return Err(BotError::Config(format!(
                    "{} API credentials are required for live trading",
                    venue.id
                )));
            }
        }
        Ok(())
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        self.venues.iter().map(|v| (v.id.clone(), v.fee_rate)).collect()
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_millis(self.quote_timeout_ms)
    }

    pub fn order_timeout(&self) -> Duration {
        Duration::from_millis(self.order_timeout_ms)
    }

    /// Ceiling for a venue's HTTP client. Quote and order calls get their
    /// own tighter bounds from the cycle and the dispatcher.
    pub fn venue_timeout(&self) -> Duration {
        self.quote_timeout()
            .max(self.order_timeout())
            .max(Duration::from_secs(1))
    }
}

fn load_venue(id: VenueId) -> VenueConfig {
    let prefix = id.as_str().to_uppercase();
    VenueConfig {
        fee_rate: env_decimal(&format!("{prefix}_FEE_RATE")).unwrap_or(DEFAULT_TAKER_FEE),
        api_key: env::var(format!("{prefix}_API_KEY")).ok().filter(|s| !s.is_empty()),
        api_secret: env::var(format!("{prefix}_API_SECRET")).ok().filter(|s| !s.is_empty()),
        base_url: env::var(format!("{prefix}_BASE_URL")).ok().filter(|s| !s.is_empty()),
        id,
    }
}

fn env_list(key: &str) -> Option<Vec<String>> {
    let list: Vec<String> = env::var(key)
        .ok()?
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!list.is_empty()).then_some(list)
}

fn env_decimal(key: &str) -> Option<Decimal> {
    env::var(key).ok().and_then(|s| Decimal::from_str(s.trim()).ok())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
