//! Execution persistence

use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;
use crate::types::ExecutionResult;

pub fn save_execution(output_dir: &Path, execution: &ExecutionResult) -> Result<()> {
    let filename = output_dir
        .join("executions")
        .join(format!("trades_{}.jsonl", Utc::now().format("%Y-%m-%d")));

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    writeln!(file, "{}", serde_json::to_string(execution)?)?;

    info!(
        execution_id = %execution.id,
        opportunity_id = %execution.opportunity_id,
        status = ?execution.status,
        mode = %execution.mode,
        realized_profit = %execution.realized_profit_estimate,
        "Saved trade execution"
    );

    Ok(())
}
