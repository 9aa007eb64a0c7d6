//! Validation of venue data before it is used

pub mod quote;

pub use quote::*;
