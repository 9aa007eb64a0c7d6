//! Custom error types for the bot

use thiserror::Error;

/// Failure fetching a quote from one venue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("quote request timed out")]
    Timeout,

    #[error("trading pair not listed")]
    PairNotFound,

    #[error("authentication failed")]
    AuthFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("{0}")]
    Unknown(String),
}

/// Failure placing one order leg.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("rate limited")]
    RateLimited,

    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("order placement timed out")]
    Timeout,

    #[error("{0}")]
    Unknown(String),
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Need at least 2 reachable venues, found {reachable}")]
    NoVenuesReachable { reachable: usize },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },
}

pub type BotResult<T> = Result<T, BotError>;
