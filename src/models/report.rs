//! Evaluation records and fitness reports.
//!
//! A [`RunOutcome`] is the three-way result of one external synthesizer
//! run. Records are folded into one scalar fitness per individual by a
//! single explicit pass — no tabular dependency.
//!
//! # Aggregation policy
//!
//! Fitness is the sum of elapsed seconds over successful runs; every
//! failed or timed-out run contributes a fixed penalty (by default the
//! per-run timeout). This keeps fitness finite, and failing individuals
//! are never favored over slow-but-successful ones.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Outcome of one external synthesizer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Clean exit with well-formed telemetry.
    Succeeded {
        /// Elapsed synthesis time reported by the run's telemetry.
        elapsed_secs: f64,
    },
    /// Non-zero exit status, or telemetry missing/unreadable.
    Failed {
        /// Human-readable failure cause, for the audit artifact.
        reason: String,
    },
    /// The run exceeded the wall-clock limit and was killed.
    TimedOut,
}

impl RunOutcome {
    /// True for `Succeeded`.
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded { .. })
    }

    /// Status label used in the stats artifact.
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Succeeded { .. } => "succeeded",
            RunOutcome::Failed { .. } => "failed",
            RunOutcome::TimedOut => "timeout",
        }
    }
}

/// One (individual, benchmark, repetition) run outcome.
///
/// Ephemeral: produced and consumed within a single fitness evaluation,
/// persisted only into the audit artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Benchmark the synthesizer ran on.
    pub benchmark: PathBuf,
    /// Zero-based repetition index.
    pub repetition: u32,
    /// What happened.
    pub outcome: RunOutcome,
}

/// Whether an individual produced any usable measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    /// At least one run succeeded.
    Complete,
    /// Every run failed or timed out; fitness is the worst observable
    /// score. The individual stays in the population — it may still be
    /// useful genetic material if all peers fail too.
    Partial,
}

/// Aggregated evaluation result for one individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessReport {
    /// Population the individual belongs to.
    pub population_id: u32,
    /// Individual the report scores.
    pub individual_id: u32,
    /// Scalar fitness (seconds, lower = better).
    pub fitness: f64,
    /// Complete or partial-due-to-failures.
    pub status: ReportStatus,
    /// Raw per-run records, kept for the audit artifact.
    pub records: Vec<EvaluationRecord>,
}

impl FitnessReport {
    /// Folds per-run records into the scalar fitness.
    ///
    /// `penalty_secs` is charged per failed or timed-out run; an
    /// individual whose every run fails scores exactly
    /// `records.len() * penalty_secs`.
    pub fn aggregate(
        population_id: u32,
        individual_id: u32,
        records: Vec<EvaluationRecord>,
        penalty_secs: f64,
    ) -> Self {
        let mut fitness = 0.0;
        let mut any_success = false;
        for record in &records {
            match &record.outcome {
                RunOutcome::Succeeded { elapsed_secs } => {
                    fitness += elapsed_secs;
                    any_success = true;
                }
                RunOutcome::Failed { .. } | RunOutcome::TimedOut => fitness += penalty_secs,
            }
        }
        let status = if any_success {
            ReportStatus::Complete
        } else {
            ReportStatus::Partial
        };
        Self {
            population_id,
            individual_id,
            fitness,
            status,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(repetition: u32, outcome: RunOutcome) -> EvaluationRecord {
        EvaluationRecord {
            benchmark: PathBuf::from("bench/swap.syn"),
            repetition,
            outcome,
        }
    }

    #[test]
    fn test_mixed_runs_sum_with_timeout_penalty() {
        // One benchmark, three repetitions, times [2.0, timeout, 3.0],
        // per-run timeout 10.0 → fitness 15.0 and still Complete.
        let records = vec![
            record(0, RunOutcome::Succeeded { elapsed_secs: 2.0 }),
            record(1, RunOutcome::TimedOut),
            record(2, RunOutcome::Succeeded { elapsed_secs: 3.0 }),
        ];
        let report = FitnessReport::aggregate(3, 12, records, 10.0);
        assert_eq!(report.fitness, 15.0);
        assert_eq!(report.status, ReportStatus::Complete);
    }

    #[test]
    fn test_all_timeouts_score_worst_observable() {
        // repetitions * benchmark_count * per_run_timeout
        let records: Vec<EvaluationRecord> =
            (0..6).map(|r| record(r, RunOutcome::TimedOut)).collect();
        let report = FitnessReport::aggregate(0, 0, records, 10.0);
        assert_eq!(report.fitness, 60.0);
        assert_eq!(report.status, ReportStatus::Partial);
    }

    #[test]
    fn test_failures_penalized_like_timeouts() {
        let records = vec![
            record(0, RunOutcome::Failed { reason: "exit 1".into() }),
            record(1, RunOutcome::TimedOut),
        ];
        let report = FitnessReport::aggregate(0, 0, records, 7.5);
        assert_eq!(report.fitness, 15.0);
        assert_eq!(report.status, ReportStatus::Partial);
    }

    #[test]
    fn test_fitness_monotone_in_elapsed_times() {
        let fast = vec![
            record(0, RunOutcome::Succeeded { elapsed_secs: 1.0 }),
            record(1, RunOutcome::TimedOut),
            record(2, RunOutcome::Succeeded { elapsed_secs: 2.0 }),
        ];
        let slow = vec![
            record(0, RunOutcome::Succeeded { elapsed_secs: 1.5 }),
            record(1, RunOutcome::TimedOut),
            record(2, RunOutcome::Succeeded { elapsed_secs: 2.5 }),
        ];
        let fast_report = FitnessReport::aggregate(0, 0, fast, 10.0);
        let slow_report = FitnessReport::aggregate(0, 1, slow, 10.0);
        assert!(fast_report.fitness < slow_report.fitness);
    }

    #[test]
    fn test_empty_records_are_partial() {
        let report = FitnessReport::aggregate(0, 0, Vec::new(), 10.0);
        assert_eq!(report.fitness, 0.0);
        assert_eq!(report.status, ReportStatus::Partial);
    }
}
