//! External synthesizer invocation.
//!
//! [`ExternalRunner`] is the capability boundary between the tuner and the
//! black-box synthesizer: one call, one process, a three-way outcome.
//! [`SynthesizerRunner`] is the production implementation; tests substitute
//! scripted runners.
//!
//! The wall-clock timeout is enforced here, not trusted to the external
//! process: on expiry the child is killed and reaped before the outcome is
//! returned, so a timed-out run can never leak a process or hold a worker
//! slot. `kill_on_drop` covers cancellation paths where the future is
//! dropped mid-run.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::telemetry;
use crate::config::EvaluationConfig;
use crate::error::LaunchError;
use crate::models::RunOutcome;

/// Identity and limits of one synthesizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    /// Population the individual belongs to.
    pub population_id: u32,
    /// Individual whose genome the synthesizer loads.
    pub individual_id: u32,
    /// Benchmark file to synthesize.
    pub benchmark: PathBuf,
    /// Zero-based repetition index.
    pub repetition: u32,
    /// Hard wall-clock limit.
    pub timeout: Duration,
}

/// Capability to run the external synthesizer once.
///
/// Per-run failures are values in [`RunOutcome`]; `Err` is reserved for
/// the structural case where the program cannot be launched at all.
#[async_trait]
pub trait ExternalRunner: Send + Sync {
    /// Runs the synthesizer once and reports the three-way outcome.
    async fn run(&self, request: &RunRequest) -> Result<RunOutcome, LaunchError>;
}

/// Spawns the real synthesizer process.
///
/// Invocation shape (matching the synthesizer's CLI):
/// `<program> <program_args..> <benchmark> -t=<timeout_ms>
/// --evolutionary true --populationID <p> --individualID <i>`.
/// The identity flags tell the synthesizer which genome file to load;
/// its telemetry lands at a path derived from the same identity.
#[derive(Debug, Clone)]
pub struct SynthesizerRunner {
    program: String,
    program_args: Vec<String>,
    results_dir: PathBuf,
}

impl SynthesizerRunner {
    /// Creates a runner from the evaluation config and results directory.
    pub fn new(config: &EvaluationConfig, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: config.synthesizer_program.clone(),
            program_args: config.synthesizer_args.clone(),
            results_dir: results_dir.into(),
        }
    }
}

#[async_trait]
impl ExternalRunner for SynthesizerRunner {
    async fn run(&self, request: &RunRequest) -> Result<RunOutcome, LaunchError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.program_args)
            .arg(&request.benchmark)
            .arg(format!("-t={}", request.timeout.as_millis()))
            .args(["--evolutionary", "true"])
            .arg("--populationID")
            .arg(request.population_id.to_string())
            .arg("--individualID")
            .arg(request.individual_id.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| LaunchError {
            program: self.program.clone(),
            source,
        })?;

        let status = match timeout(request.timeout, child.wait()).await {
            Err(_) => {
                // Kill and reap; the worker slot must be reclaimed.
                if let Err(error) = child.kill().await {
                    warn!(%error, individual = request.individual_id,
                          "failed to kill timed-out synthesizer run");
                }
                debug!(
                    individual = request.individual_id,
                    benchmark = %request.benchmark.display(),
                    repetition = request.repetition,
                    "synthesizer run timed out"
                );
                return Ok(RunOutcome::TimedOut);
            }
            Ok(Err(error)) => {
                return Ok(RunOutcome::Failed {
                    reason: format!("wait on synthesizer failed: {error}"),
                })
            }
            Ok(Ok(status)) => status,
        };

        if !status.success() {
            return Ok(RunOutcome::Failed {
                reason: format!("synthesizer exited with {status}"),
            });
        }

        let telemetry_path = telemetry::run_telemetry_path(
            &self.results_dir,
            request.population_id,
            request.individual_id,
            &request.benchmark,
            request.repetition,
        );
        match telemetry::read_elapsed_secs(&telemetry_path) {
            Ok(elapsed_secs) => Ok(RunOutcome::Succeeded { elapsed_secs }),
            Err(error) => Ok(RunOutcome::Failed {
                reason: format!("telemetry unusable: {error}"),
            }),
        }
    }
}
