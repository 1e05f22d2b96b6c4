//! Export run results.
//!
//! - CSV: one row per (model, scenario), easy to load in a spreadsheet
//! - JSON: the full run (records with keyword hits, statistics, verdict)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::domain::ResultRecord;
use crate::error::AppError;

const CSV_HEADER: [&str; 10] = [
    "model",
    "scenario_id",
    "scenario_context",
    "baseline_score",
    "checklist_score",
    "baseline_matches",
    "checklist_matches",
    "baseline_words",
    "checklist_words",
    "improvement",
];

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    model: &'a str,
    scenario_id: &'a str,
    scenario_context: &'a str,
    baseline_score: f64,
    checklist_score: f64,
    baseline_matches: usize,
    checklist_matches: usize,
    baseline_words: usize,
    checklist_words: usize,
    improvement: f64,
}

impl<'a> From<&'a ResultRecord> for CsvRow<'a> {
    fn from(r: &'a ResultRecord) -> Self {
        Self {
            model: &r.model,
            scenario_id: &r.scenario_id,
            scenario_context: &r.scenario_context,
            baseline_score: r.baseline.value,
            checklist_score: r.checklist.value,
            baseline_matches: r.baseline.matches,
            checklist_matches: r.checklist.matches,
            baseline_words: r.baseline.words,
            checklist_words: r.checklist.words,
            improvement: r.improvement(),
        }
    }
}

/// Write per-pair results to a CSV file. The header is written even when
/// there are no records.
pub fn write_results_csv(path: &Path, records: &[ResultRecord]) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;
    for r in records {
        writer
            .serialize(CsvRow::from(r))
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the whole run as pretty JSON.
pub fn write_run_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, run)
        .map_err(|e| AppError::io(format!("Failed to write export JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export JSON: {e}")))?;
    Ok(())
}
