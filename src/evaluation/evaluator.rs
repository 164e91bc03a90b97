//! Fitness evaluation.
//!
//! [`FitnessEvaluator::evaluate`] runs one individual through the whole
//! benchmark × repetition grid and folds the records into a
//! [`FitnessReport`]. [`FitnessEvaluator::evaluate_population`] fans
//! unevaluated individuals out over a bounded worker pool and acts as the
//! generation's synchronization barrier: it returns only when every
//! individual has a report.
//!
//! Individuals share no mutable state — each owns its genome and
//! telemetry artifacts by `(population_id, individual_id)` — so the pool
//! is embarrassingly parallel; the semaphore only limits how many external
//! synthesizer processes exist at once.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::runner::{ExternalRunner, RunRequest};
use super::telemetry;
use crate::config::EvaluationConfig;
use crate::error::{LaunchError, TunerError};
use crate::models::{EvaluationRecord, FitnessReport, Individual, Population};

/// Runs individuals through the external synthesizer and scores them.
///
/// Cheap to clone: workers each hold their own handle to the shared
/// runner.
#[derive(Clone)]
pub struct FitnessEvaluator {
    runner: Arc<dyn ExternalRunner>,
    config: EvaluationConfig,
    results_dir: PathBuf,
}

impl FitnessEvaluator {
    /// Creates an evaluator over the given runner.
    pub fn new(
        runner: Arc<dyn ExternalRunner>,
        config: EvaluationConfig,
        results_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            config,
            results_dir: results_dir.into(),
        }
    }

    /// Runs per evaluation: benchmarks × repetitions.
    pub fn runs_per_individual(&self) -> usize {
        self.config.benchmarks.len() * self.config.repetitions as usize
    }

    /// Evaluates one individual across all benchmarks and repetitions.
    ///
    /// Per-run failures and timeouts become penalized records; only a
    /// launch failure (binary missing) is an error.
    pub async fn evaluate(&self, individual: &Individual) -> Result<FitnessReport, LaunchError> {
        let mut records = Vec::with_capacity(self.runs_per_individual());
        for benchmark in &self.config.benchmarks {
            for repetition in 0..self.config.repetitions {
                let request = RunRequest {
                    population_id: individual.population_id,
                    individual_id: individual.individual_id,
                    benchmark: benchmark.clone(),
                    repetition,
                    timeout: self.config.per_run_timeout,
                };
                let outcome = self.runner.run(&request).await?;
                debug!(
                    individual = individual.individual_id,
                    benchmark = %benchmark.display(),
                    repetition,
                    outcome = outcome.label(),
                    "synthesizer run finished"
                );
                records.push(EvaluationRecord {
                    benchmark: benchmark.clone(),
                    repetition,
                    outcome,
                });
            }
        }

        let report = FitnessReport::aggregate(
            individual.population_id,
            individual.individual_id,
            records,
            self.config.failure_penalty(),
        );

        // Audit artifact for external tooling; never read back, so a write
        // failure must not fail the evaluation.
        let stats = telemetry::stats_path(
            &self.results_dir,
            report.population_id,
            report.individual_id,
        );
        if let Err(error) = telemetry::write_stats(&stats, &report) {
            warn!(%error, path = %stats.display(), "could not write stats artifact");
        }

        Ok(report)
    }

    /// Evaluates every member of `population` that lacks a fitness value,
    /// at most `max_concurrency` external processes at a time.
    ///
    /// Acts as the generation barrier: on success every member has a
    /// fitness and exactly one report exists per evaluated individual.
    /// A launch failure aborts all in-flight evaluations (their child
    /// processes are killed via `kill_on_drop`) and surfaces the error.
    pub async fn evaluate_population(
        &self,
        population: &mut Population,
    ) -> Result<Vec<FitnessReport>, TunerError> {
        let pending: Vec<Individual> = population
            .individuals
            .iter()
            .filter(|i| i.fitness.is_none())
            .cloned()
            .collect();
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            generation = population.generation,
            pending = pending.len(),
            workers = self.config.max_concurrency,
            "evaluating generation"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for individual in pending {
            let evaluator = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed while tasks run; treat a
                // closed permit as a lost evaluation.
                let permit = semaphore.acquire_owned().await;
                match permit {
                    Ok(_permit) => {
                        let report = evaluator.evaluate(&individual).await;
                        (individual.individual_id, Some(report))
                    }
                    Err(_) => (individual.individual_id, None),
                }
            });
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Some(Ok(report)))) => reports.push(report),
                Ok((id, Some(Err(launch)))) => {
                    tasks.abort_all();
                    warn!(individual = id, "aborting generation: synthesizer unlaunchable");
                    return Err(launch.into());
                }
                Ok((id, None)) => {
                    tasks.abort_all();
                    return Err(TunerError::EvaluationLost(format!(
                        "worker permit lost for individual {id}"
                    )));
                }
                Err(join_error) => {
                    tasks.abort_all();
                    return Err(TunerError::EvaluationLost(join_error.to_string()));
                }
            }
        }

        reports.sort_by_key(|r| r.individual_id);
        for report in &reports {
            population.set_fitness(report.individual_id, report.fitness);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunOutcome;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::tempdir;

    /// Scripted runner: fixed outcome per call, tracks peak concurrency.
    struct ScriptedRunner {
        outcome: RunOutcome,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedRunner {
        fn new(outcome: RunOutcome) -> Self {
            Self {
                outcome,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ExternalRunner for ScriptedRunner {
        async fn run(&self, _request: &RunRequest) -> Result<RunOutcome, LaunchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(self.outcome.clone())
        }
    }

    /// Runner that cannot launch at all.
    struct BrokenRunner;

    #[async_trait]
    impl ExternalRunner for BrokenRunner {
        async fn run(&self, _request: &RunRequest) -> Result<RunOutcome, LaunchError> {
            Err(LaunchError {
                program: "missing".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    fn individual(id: u32) -> Individual {
        Individual::new(0, id, vec!["r1".into(), "r2".into(), "r3".into()])
    }

    fn config(benchmarks: usize, repetitions: u32, workers: usize) -> EvaluationConfig {
        EvaluationConfig::new("unused")
            .with_benchmarks(
                (0..benchmarks)
                    .map(|i| PathBuf::from(format!("bench/b{i}.syn")))
                    .collect(),
            )
            .with_repetitions(repetitions)
            .with_per_run_timeout(Duration::from_secs_f64(10.0))
            .with_max_concurrency(workers)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_of_two_reports_all_five_exactly_once() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new(RunOutcome::Succeeded {
            elapsed_secs: 1.0,
        }));
        let evaluator = Arc::new(FitnessEvaluator::new(
            runner.clone(),
            config(1, 1, 2),
            dir.path(),
        ));

        let mut population = Population::new(0, (0..5).map(individual).collect());
        let reports = evaluator.evaluate_population(&mut population).await.unwrap();

        assert_eq!(reports.len(), 5);
        let mut ids: Vec<u32> = reports.iter().map(|r| r.individual_id).collect();
        ids.dedup();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(population.all_evaluated());
        assert!(runner.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_all_timeouts_score_grid_times_penalty() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new(RunOutcome::TimedOut));
        // 2 benchmarks x 3 repetitions, 10s timeout -> fitness 60.0
        let evaluator = Arc::new(FitnessEvaluator::new(runner, config(2, 3, 1), dir.path()));

        let report = evaluator.evaluate(&individual(7)).await.unwrap();
        assert_eq!(report.fitness, 60.0);
        assert_eq!(report.records.len(), 6);
        assert_eq!(report.status, crate::models::ReportStatus::Partial);
    }

    #[tokio::test]
    async fn test_stats_artifact_written_per_individual() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new(RunOutcome::Succeeded {
            elapsed_secs: 2.5,
        }));
        let evaluator = Arc::new(FitnessEvaluator::new(runner, config(1, 2, 1), dir.path()));

        evaluator.evaluate(&individual(4)).await.unwrap();
        assert!(telemetry::stats_path(dir.path(), 0, 4).exists());
    }

    #[tokio::test]
    async fn test_launch_failure_aborts_generation() {
        let dir = tempdir().unwrap();
        let evaluator = Arc::new(FitnessEvaluator::new(
            Arc::new(BrokenRunner),
            config(1, 1, 2),
            dir.path(),
        ));

        let mut population = Population::new(0, (0..3).map(individual).collect());
        let result = evaluator.evaluate_population(&mut population).await;
        assert!(matches!(result, Err(TunerError::Launch(_))));
    }

    #[tokio::test]
    async fn test_already_evaluated_members_are_skipped() {
        let dir = tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new(RunOutcome::Succeeded {
            elapsed_secs: 1.0,
        }));
        let evaluator = Arc::new(FitnessEvaluator::new(runner, config(1, 1, 1), dir.path()));

        let mut elite = individual(0);
        elite.fitness = Some(3.0);
        let mut population = Population::new(0, vec![elite, individual(1)]);

        let reports = evaluator.evaluate_population(&mut population).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].individual_id, 1);
        // Elite fitness untouched.
        assert_eq!(population.individuals[0].fitness, Some(3.0));
    }
}
