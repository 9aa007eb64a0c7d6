//! Console reporting through `tracing`

use anyhow::Result;
use tracing::{debug, info, warn};
use crate::{
    stats::Statistics,
    utils::{print_execution, print_final_statistics, print_opportunity, print_session_stats, print_venue_health},
};
use super::{CycleReport, ReportSink};

/// Prints opportunity and execution banners every cycle, and the running
/// statistics every `stats_every` cycles.
pub struct ConsoleSink {
    stats_every: u64,
}

impl ConsoleSink {
    pub fn new(stats_every: u64) -> Self {
        Self {
            stats_every: stats_every.max(1),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ReportSink for ConsoleSink {
    fn report(&mut self, report: &CycleReport) -> Result<()> {
        for failure in &report.failures {
            debug!("   {} {}: {}", failure.venue, failure.symbol, failure.reason);
        }

        if report.opportunities.is_empty() {
            info!(
                "Cycle {}: {} quotes, {} failures, no opportunities",
                report.cycle,
                report.quotes.len(),
                report.failures.len()
            );
        } else {
            for (rank, opportunity) in report.opportunities.iter().enumerate() {
                print_opportunity(rank + 1, opportunity);
            }
        }

        if report.dispatch_blocked {
            warn!("⚡ Circuit breaker is OPEN, best opportunity not dispatched");
        }
        if let Some(execution) = &report.dispatch {
            print_execution(execution);
        }

        if report.cycle % self.stats_every == 0 {
            print_session_stats(&report.statistics);
            print_venue_health(&report.venue_health);
        }
        Ok(())
    }

    fn finish(&mut self, statistics: &Statistics) -> Result<()> {
        print_final_statistics(statistics);
        Ok(())
    }
}
