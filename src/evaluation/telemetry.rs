//! Telemetry parsing and audit artifacts.
//!
//! The external synthesizer writes one telemetry CSV per run, at a path
//! derived from the run's identity. The only field the tuner needs is the
//! `Time(mut)` column (elapsed synthesis time in milliseconds); it is
//! folded into the run's elapsed seconds by one explicit pass over the
//! rows.
//!
//! After aggregation the evaluator writes one stats artifact per
//! individual (`stats-performance_{pop}_{ind}.csv`) for external
//! reporting tooling. The tuner never reads it back.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{FitnessReport, RunOutcome};

/// Column carrying elapsed synthesis time, in milliseconds.
pub const TIME_COLUMN: &str = "Time(mut)";

/// Telemetry that is present but unusable.
///
/// Treated exactly like a crashed run: the evaluator records the run as
/// failed and charges the penalty. Never propagated upward.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The telemetry file could not be read.
    #[error("telemetry {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header row lacks the required time column.
    #[error("telemetry {path:?} has no '{TIME_COLUMN}' column")]
    MissingTimeColumn { path: PathBuf },

    /// A data row's time cell is not a number.
    #[error("telemetry {path:?} line {line}: unparsable time '{value}'")]
    BadValue {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// Header only, no measurements.
    #[error("telemetry {path:?} contains no data rows")]
    NoRows { path: PathBuf },
}

/// Path of the telemetry file one run writes.
pub fn run_telemetry_path(
    results_dir: &Path,
    population_id: u32,
    individual_id: u32,
    benchmark: &Path,
    repetition: u32,
) -> PathBuf {
    let bench = benchmark
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("benchmark");
    results_dir.join(format!(
        "telemetry_{population_id}_{individual_id}_{bench}_{repetition}.csv"
    ))
}

/// Path of the per-individual aggregated stats artifact.
pub fn stats_path(results_dir: &Path, population_id: u32, individual_id: u32) -> PathBuf {
    results_dir.join(format!(
        "stats-performance_{population_id}_{individual_id}.csv"
    ))
}

/// Reads one run's telemetry and folds the time column into elapsed
/// seconds.
pub fn read_elapsed_secs(path: &Path) -> Result<f64, TelemetryError> {
    let contents = fs::read_to_string(path).map_err(|source| TelemetryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut lines = contents.lines().enumerate();

    let header = lines
        .next()
        .ok_or_else(|| TelemetryError::NoRows {
            path: path.to_path_buf(),
        })?
        .1;
    let time_index = header
        .split(',')
        .position(|column| column.trim() == TIME_COLUMN)
        .ok_or_else(|| TelemetryError::MissingTimeColumn {
            path: path.to_path_buf(),
        })?;

    let mut total_ms = 0.0;
    let mut rows = 0usize;
    for (line_index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cell = line.split(',').nth(time_index).unwrap_or("").trim();
        let value: f64 = cell.parse().map_err(|_| TelemetryError::BadValue {
            path: path.to_path_buf(),
            line: line_index + 1,
            value: cell.to_string(),
        })?;
        total_ms += value;
        rows += 1;
    }
    if rows == 0 {
        return Err(TelemetryError::NoRows {
            path: path.to_path_buf(),
        });
    }
    Ok(total_ms / 1000.0)
}

/// Writes the per-individual audit artifact: one row per run plus a
/// trailing total row carrying the aggregated fitness.
pub fn write_stats(path: &Path, report: &FitnessReport) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    writeln!(
        file,
        "populationID,individualID,benchmark,repetition,status,elapsedSecs"
    )?;
    for record in &report.records {
        let elapsed = match &record.outcome {
            RunOutcome::Succeeded { elapsed_secs } => format!("{elapsed_secs}"),
            RunOutcome::Failed { .. } | RunOutcome::TimedOut => String::new(),
        };
        writeln!(
            file,
            "{},{},{},{},{},{}",
            report.population_id,
            report.individual_id,
            record.benchmark.display(),
            record.repetition,
            record.outcome.label(),
            elapsed
        )?;
    }
    writeln!(
        file,
        "{},{},TOTAL,,{},{}",
        report.population_id,
        report.individual_id,
        match report.status {
            crate::models::ReportStatus::Complete => "complete",
            crate::models::ReportStatus::Partial => "partial",
        },
        report.fitness
    )?;
    Ok(())
}
