//! HTTP plumbing shared by the venue clients

pub mod retry;
pub mod signing;

pub use retry::*;
pub use signing::*;

use std::time::Duration;
use crate::errors::{OrderError, QuoteError};

pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("cex-arb-bot/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub fn quote_transport_error(e: reqwest::Error) -> QuoteError {
    if e.is_timeout() {
        QuoteError::Timeout
    } else {
        QuoteError::Unknown(e.to_string())
    }
}

pub fn order_transport_error(e: reqwest::Error) -> OrderError {
    if e.is_timeout() {
        OrderError::Timeout
    } else {
        OrderError::Unknown(e.to_string())
    }
}
