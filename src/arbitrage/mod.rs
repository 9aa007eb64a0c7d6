//! Opportunity detection, ranking and sizing

pub mod calculator;
pub mod ranking;
pub mod sizing;

pub use calculator::*;
pub use ranking::*;
pub use sizing::*;
