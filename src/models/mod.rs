//! Tuning domain models.
//!
//! Core data types for evolving rule-application orders:
//!
//! | Type | Role |
//! |------|------|
//! | [`RuleSet`] | Canonical any-phase rules, in default order |
//! | [`Individual`] | One candidate permutation + its fitness |
//! | [`Population`] | Individuals of one generation |
//! | [`EvaluationRecord`] | Outcome of one external run |
//! | [`FitnessReport`] | Per-individual aggregation of records |

mod individual;
mod population;
mod report;
mod rules;

pub use individual::Individual;
pub use population::Population;
pub use report::{EvaluationRecord, FitnessReport, ReportStatus, RunOutcome};
pub use rules::RuleSet;
