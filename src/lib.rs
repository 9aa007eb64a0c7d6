//! CEX Arbitrage Bot - cross-venue spot arbitrage for centralized exchanges
//!
//! Polls several exchanges for the same symbols, finds buy-low/sell-high
//! pairs that still clear a minimum profit after taker fees, ranks them and
//! dispatches the best one each cycle, either simulated or live.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod venues;
pub mod arbitrage;
pub mod execution;
pub mod cycle;
pub mod stats;
pub mod reporting;
pub mod validation;
pub mod utils;
pub mod storage;

// Re-export commonly used items
pub use config::{Config, VenueConfig, CONFIG};
pub use cycle::{CycleState, ExecutionCycle};
pub use errors::{BotError, BotResult, OrderError, QuoteError};
pub use stats::Statistics;
pub use types::*;
