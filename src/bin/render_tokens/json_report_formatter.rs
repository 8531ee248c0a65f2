use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use logprob_viz::{TokenRenderPayload, Visualization, VisualizerConfig};
use serde::Serialize;

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub schema_version: u32,
    pub meta: Meta,
    pub tokens: Vec<TokenEntry<'a>>,
    pub failures: Vec<FailureEntry>,
    pub html: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub input_path: String,
    pub record_count: usize,
    pub rendered_count: usize,
    pub failure_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    pub decimals: usize,
}

#[derive(Debug, Serialize)]
pub struct TokenEntry<'a> {
    pub index: usize,
    pub payload: &'a TokenRenderPayload,
}

#[derive(Debug, Serialize)]
pub struct FailureEntry {
    pub index: usize,
    pub message: String,
}

pub fn build_report<'a>(
    input_path: &Path,
    record_count: usize,
    top_p: Option<f64>,
    config: &VisualizerConfig,
    visualization: &'a Visualization,
) -> Report<'a> {
    Report {
        schema_version: SCHEMA_VERSION,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            input_path: input_path.display().to_string(),
            record_count,
            rendered_count: visualization.payloads.len(),
            failure_count: visualization.failures.len(),
            top_p,
            decimals: config.decimals,
        },
        tokens: visualization
            .source_indices
            .iter()
            .zip(&visualization.payloads)
            .map(|(&index, payload)| TokenEntry { index, payload })
            .collect(),
        failures: visualization
            .failures
            .iter()
            .map(|failure| FailureEntry {
                index: failure.index,
                message: failure.error.to_string(),
            })
            .collect(),
        html: &visualization.html,
    }
}

pub fn write_report(path: Option<&Path>, report: &Report<'_>) -> Result<(), String> {
    let Some(path) = path else {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        serde_json::to_writer_pretty(&mut lock, report)
            .map_err(|err| format!("Failed to serialize report JSON to stdout: {err}"))?;
        return lock
            .write_all(b"\n")
            .map_err(|err| format!("Failed to finalize report on stdout: {err}"));
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create report output directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let mut file = File::create(path)
        .map_err(|err| format!("Failed to create report file '{}': {err}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, report).map_err(|err| {
        format!(
            "Failed to serialize report JSON '{}': {err}",
            path.display()
        )
    })?;
    file.write_all(b"\n")
        .map_err(|err| format!("Failed to finalize report file '{}': {err}", path.display()))?;
    Ok(())
}
