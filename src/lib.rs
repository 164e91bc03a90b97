//! Evolutionary tuner for program-synthesizer rule-application orders.
//!
//! Evolves the relative order of a synthesizer's "any-phase" rules with a
//! generational genetic algorithm. Candidates are scored by real,
//! expensive, occasionally non-terminating synthesis runs: each
//! individual's genome is written to a JSON file, the synthesizer is
//! launched per benchmark and repetition under a hard wall-clock timeout,
//! and its telemetry is folded into a scalar fitness (total elapsed time,
//! lower = better).
//!
//! # Modules
//!
//! - **`models`**: `RuleSet`, `Individual`, `Population`, evaluation
//!   records and fitness reports
//! - **`codec`**: fail-closed JSON genome persistence, addressed by
//!   `(population_id, individual_id)`
//! - **`ga`**: permutation-preserving crossover/mutation and selection
//! - **`evaluation`**: external-process runner, telemetry, bounded
//!   worker-pool evaluation barrier
//! - **`engine`**: the generational state machine
//!
//! # Architecture
//!
//! The synthesizer itself is out of scope: all interaction is process
//! invocation plus file-based genome/telemetry exchange. Per-run failures
//! are absorbed into fitness as penalties; only structural problems
//! (malformed configuration, unlaunchable binary) abort an experiment.

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod models;
