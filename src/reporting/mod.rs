//! Per-cycle reporting

pub mod console;
pub mod jsonl;

pub use console::*;
pub use jsonl::*;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use crate::{
    stats::Statistics,
    types::{ExecutionResult, Opportunity, PriceQuote, VenueHealth, VenueId},
};

/// A quote request that produced nothing usable this cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteFailure {
    pub venue: VenueId,
    pub symbol: String,
    pub reason: String,
}

/// Everything a cycle produced, handed to the sinks once per cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub quotes: Vec<PriceQuote>,
    pub failures: Vec<QuoteFailure>,
    /// Best first. Only the head was considered for dispatch.
    pub opportunities: Vec<Opportunity>,
    pub dispatch: Option<ExecutionResult>,
    /// Set when a qualifying opportunity was held back by the circuit breaker.
    pub dispatch_blocked: bool,
    pub statistics: Statistics,
    pub venue_health: Vec<VenueHealth>,
}

pub trait ReportSink: Send {
    fn report(&mut self, report: &CycleReport) -> Result<()>;

    /// Called once at shutdown with the final totals.
    fn finish(&mut self, _statistics: &Statistics) -> Result<()> {
        Ok(())
    }
}

/// Forwards to every sink; one failing sink does not starve the others.
#[derive(Default)]
pub struct FanoutReporter {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl FanoutReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportSink for FanoutReporter {
    fn report(&mut self, report: &CycleReport) -> Result<()> {
        for sink in &mut self.sinks {
            if let Err(e) = sink.report(report) {
                warn!("Report sink failed for cycle {}: {}", report.cycle, e);
            }
        }
        Ok(())
    }

    fn finish(&mut self, statistics: &Statistics) -> Result<()> {
        for sink in &mut self.sinks {
            if let Err(e) = sink.finish(statistics) {
                warn!("Report sink failed to finish: {}", e);
            }
        }
        Ok(())
    }
}
