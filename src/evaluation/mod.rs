//! External evaluation of individuals.
//!
//! Coordinates the unreliable, long-running external synthesizer under
//! per-run timeouts and a bounded worker pool, and turns raw run
//! telemetry into scalar fitness values.
//!
//! # Submodules
//!
//! - [`runner`]: the `ExternalRunner` capability and the process-spawning
//!   production implementation
//! - [`telemetry`]: per-run telemetry parsing and per-individual audit
//!   artifacts
//! - [`evaluator`]: aggregation and the generation-level evaluation
//!   barrier

pub mod evaluator;
pub mod runner;
pub mod telemetry;

pub use evaluator::FitnessEvaluator;
pub use runner::{ExternalRunner, RunRequest, SynthesizerRunner};
pub use telemetry::TelemetryError;
