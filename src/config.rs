//! Experiment configuration.
//!
//! Replaces the fixed path constants and inline magic numbers of ad-hoc
//! tuning scripts with explicit structs passed into the codec, the
//! evaluator, and the engine at construction. All structs are
//! serde-derived so an experiment definition can live in a file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Filesystem layout of one tuning experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunerConfig {
    /// Directory genome files are written to (read by the synthesizer).
    pub tactics_dir: PathBuf,
    /// Seed genome: the synthesizer's default rule order.
    pub default_order_path: PathBuf,
    /// Directory for telemetry and per-individual stats artifacts.
    pub results_dir: PathBuf,
}

impl TunerConfig {
    /// Creates a layout from the three base paths.
    pub fn new(
        tactics_dir: impl Into<PathBuf>,
        default_order_path: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tactics_dir: tactics_dir.into(),
            default_order_path: default_order_path.into(),
            results_dir: results_dir.into(),
        }
    }
}

/// Parameters of the generational search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Individuals per generation (minimum 2).
    pub population_size: usize,
    /// Generation budget; the loop never runs longer than this.
    pub max_generations: u32,
    /// Probability a child is produced by crossover rather than cloned
    /// from the better parent (0.0..=1.0).
    pub crossover_rate: f64,
    /// Probability a child is mutated after construction (0.0..=1.0).
    pub mutation_rate: f64,
    /// Contestants per tournament when tournament selection is active.
    pub tournament_size: usize,
    /// Individuals carried unmodified into the next generation (minimum 1).
    pub elite_count: usize,
    /// Best-fitness improvement below this counts as a stale generation.
    pub convergence_epsilon: f64,
    /// Consecutive stale generations before the search converges.
    pub convergence_patience: u32,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            max_generations: 50,
            crossover_rate: 0.9,
            mutation_rate: 0.3,
            tournament_size: 3,
            elite_count: 1,
            convergence_epsilon: 1e-3,
            convergence_patience: 5,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, generations: u32) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets convergence detection parameters.
    pub fn with_convergence(mut self, epsilon: f64, patience: u32) -> Self {
        self.convergence_epsilon = epsilon;
        self.convergence_patience = patience;
        self
    }

    /// Fixes the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Parameters of one fitness evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// External synthesizer program (e.g. `java`).
    pub synthesizer_program: String,
    /// Arguments placed before the benchmark path (e.g. `-jar <path>`).
    pub synthesizer_args: Vec<String>,
    /// Benchmark files each individual is measured on.
    pub benchmarks: Vec<PathBuf>,
    /// Synthesizer launches per (individual, benchmark) pair.
    pub repetitions: u32,
    /// Hard wall-clock limit per run; the process is killed on expiry.
    pub per_run_timeout: Duration,
    /// Fitness penalty per failed or timed-out run, in seconds.
    /// `None` uses the per-run timeout, which keeps failing individuals
    /// strictly no better than slow-but-successful ones.
    pub failure_penalty_secs: Option<f64>,
    /// Maximum simultaneously running synthesizer processes.
    pub max_concurrency: usize,
}

impl EvaluationConfig {
    /// Creates a config for the given synthesizer program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            synthesizer_program: program.into(),
            synthesizer_args: Vec::new(),
            benchmarks: Vec::new(),
            repetitions: 1,
            per_run_timeout: Duration::from_secs(120),
            failure_penalty_secs: None,
            max_concurrency: 1,
        }
    }

    /// Sets arguments placed before the benchmark path.
    pub fn with_program_args(mut self, args: Vec<String>) -> Self {
        self.synthesizer_args = args;
        self
    }

    /// Sets the benchmark set.
    pub fn with_benchmarks(mut self, benchmarks: Vec<PathBuf>) -> Self {
        self.benchmarks = benchmarks;
        self
    }

    /// Sets repetitions per (individual, benchmark) pair.
    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Sets the per-run wall-clock timeout.
    pub fn with_per_run_timeout(mut self, timeout: Duration) -> Self {
        self.per_run_timeout = timeout;
        self
    }

    /// Overrides the failure penalty (seconds).
    pub fn with_failure_penalty_secs(mut self, penalty: f64) -> Self {
        self.failure_penalty_secs = Some(penalty);
        self
    }

    /// Sets the worker pool size.
    pub fn with_max_concurrency(mut self, workers: usize) -> Self {
        self.max_concurrency = workers;
        self
    }

    /// Effective penalty per failed or timed-out run, in seconds.
    pub fn failure_penalty(&self) -> f64 {
        self.failure_penalty_secs
            .unwrap_or_else(|| self.per_run_timeout.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_penalty_equals_timeout() {
        let config = EvaluationConfig::new("java")
            .with_per_run_timeout(Duration::from_secs_f64(10.0));
        assert_eq!(config.failure_penalty(), 10.0);
    }

    #[test]
    fn test_explicit_penalty_overrides_timeout() {
        let config = EvaluationConfig::new("java")
            .with_per_run_timeout(Duration::from_secs_f64(10.0))
            .with_failure_penalty_secs(25.0);
        assert_eq!(config.failure_penalty(), 25.0);
    }

    #[test]
    fn test_builder_chain() {
        let config = EvolutionConfig::default()
            .with_population_size(8)
            .with_elite_count(2)
            .with_seed(42);
        assert_eq!(config.population_size, 8);
        assert_eq!(config.elite_count, 2);
        assert_eq!(config.seed, Some(42));
    }
}
