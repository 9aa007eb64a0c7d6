//! Venue, quote, opportunity and execution types

pub mod quote;
pub mod fees;
pub mod arbitrage;
pub mod execution;
pub mod health;

pub use quote::*;
pub use fees::*;
pub use arbitrage::*;
pub use execution::*;
pub use health::*;
