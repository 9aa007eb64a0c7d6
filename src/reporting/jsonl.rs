//! JSONL persistence of opportunities and executions

use anyhow::Result;
use std::path::PathBuf;
use crate::storage::{save_execution, save_opportunities};
use super::{CycleReport, ReportSink};

/// Writes daily files under `<output_dir>/opportunities` and
/// `<output_dir>/executions`.
pub struct JsonlSink {
    output_dir: PathBuf,
}

impl JsonlSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl ReportSink for JsonlSink {
    fn report(&mut self, report: &CycleReport) -> Result<()> {
        save_opportunities(&self.output_dir, report.cycle, &report.opportunities)?;
        if let Some(execution) = &report.dispatch {
            save_execution(&self.output_dir, execution)?;
        }
        Ok(())
    }
}
