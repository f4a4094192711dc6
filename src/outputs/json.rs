//! JSON report output.
//!
//! Reports are grouped by date, one file per edition:
//! `{json_output_dir}/{YYYY-MM-DD}/{edition}.json`. A later run of the same
//! edition overwrites the file.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::Report;
use crate::utils::edition_for;

/// Path of the report file for a run started at `generated_at`.
pub fn report_path(json_output_dir: &str, generated_at: &DateTime<FixedOffset>) -> PathBuf {
    let date = generated_at.date_naive().to_string();
    let edition = edition_for(generated_at.time());
    PathBuf::from(json_output_dir)
        .join(date)
        .join(format!("{edition}.json"))
}

/// Serialize `report` under `json_output_dir`, returning the written path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(report: &Report, json_output_dir: &str) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(report)?;
    let path = report_path(json_output_dir, &report.generated_at);

    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring JSON directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON report");
    Ok(path)
}
