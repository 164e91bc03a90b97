//! Error taxonomy for the tuning pipeline.
//!
//! Per-run failures (a timed-out or crashed synthesizer run, unreadable
//! telemetry) are *values* — see `RunOutcome` — absorbed into the
//! individual's aggregated fitness, never propagated as errors. Only
//! structural problems surface here: a genome that fails validation, or a
//! configuration that cannot launch the external synthesizer at all.

use std::path::PathBuf;

use thiserror::Error;

/// Genome codec failures (malformed genome taxonomy).
///
/// The validation variants are fatal to the individual, not to the
/// experiment: the engine drops the offending individual and breeds a
/// replacement. The I/O variants indicate the genome store itself is
/// broken and abort the experiment.
#[derive(Debug, Error)]
pub enum CodecError {
    /// `numbOfAnyPhaseRules` disagrees with the order's actual length.
    #[error("declared rule count {declared} does not match order length {actual}")]
    CountMismatch { declared: usize, actual: usize },

    /// A rule appears more than once in the order.
    #[error("duplicate rule '{rule}' in rule order")]
    DuplicateRule { rule: String },

    /// A rule is not part of the known any-phase rule set.
    #[error("rule '{rule}' is not in the known rule set")]
    UnknownRule { rule: String },

    /// The genome file could not be read or written.
    #[error("genome file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The genome file is not valid JSON for the expected schema.
    #[error("malformed genome JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// True for validation failures that condemn one individual but leave
    /// the experiment able to continue with a replacement.
    pub fn is_malformed_genome(&self) -> bool {
        matches!(
            self,
            CodecError::CountMismatch { .. }
                | CodecError::DuplicateRule { .. }
                | CodecError::UnknownRule { .. }
        )
    }
}

/// The external synthesizer could not be launched at all.
///
/// Unlike a crashed or timed-out run, this is a configuration problem
/// (missing binary, bad working directory) and aborts the whole experiment.
#[derive(Debug, Error)]
#[error("failed to launch '{program}': {source}")]
pub struct LaunchError {
    /// Program that failed to spawn.
    pub program: String,
    /// Underlying spawn error.
    #[source]
    pub source: std::io::Error,
}

/// Experiment-level failures.
///
/// Anything that reaches this enum terminates the run with an explicit
/// abort reason; search-level setbacks (slow runs, timeouts, crashed
/// synthesizer invocations) never do.
#[derive(Debug, Error)]
pub enum TunerError {
    /// Genome store failure (unreadable seed, unwritable tactics dir).
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The external synthesizer binary cannot be spawned.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// An evaluation worker panicked or was aborted before reporting.
    #[error("an evaluation task failed to report: {0}")]
    EvaluationLost(String),

    /// The configuration cannot produce a viable experiment.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
