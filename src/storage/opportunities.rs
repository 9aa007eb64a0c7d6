//! Opportunity persistence

use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use crate::types::Opportunity;

/// Appends the ranked opportunities of one cycle to the day's JSONL file.
pub fn save_opportunities(output_dir: &Path, cycle: u64, opportunities: &[Opportunity]) -> Result<()> {
    if opportunities.is_empty() {
        return Ok(());
    }

    let filename = output_dir
        .join("opportunities")
        .join(format!("arbitrage_{}.jsonl", Utc::now().format("%Y-%m-%d")));

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    for (rank, opp) in opportunities.iter().enumerate() {
        let record = serde_json::json!({
            "cycle": cycle,
            "rank": rank + 1,
            "opportunity": opp,
        });
        writeln!(file, "{}", record)?;
    }

    debug!(
        cycle,
        count = opportunities.len(),
        best_opportunity_id = %opportunities[0].id,
        "Saved ranked opportunities"
    );

    Ok(())
}
