//! Order dispatch and simulation

pub mod engine;
pub mod simulation;

pub use engine::*;
pub use simulation::*;
