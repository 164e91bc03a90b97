//! Genetic search over rule-order permutations.
//!
//! Implements the permutation-preserving operators and the selection
//! policies used by the evolution engine.
//!
//! # Encoding
//!
//! The genome is a permutation of the any-phase rule set. Every operator
//! guarantees the child is a permutation of the same set — no duplicates,
//! no omissions, rule count never altered.
//!
//! # Submodules
//!
//! - [`operators`]: runtime-selectable crossover and mutation strategies
//! - [`selection`]: tournament and rank-based parent selection, elitism
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning", Ch. 5 (order-based operators)
//! - Eiben & Smith (2015), "Introduction to Evolutionary Computing", Ch. 4

pub mod operators;
pub mod selection;

pub use operators::{
    invert_mutation, order_crossover, pmx_crossover, swap_mutation, CrossoverType,
    GeneticOperators, MutationType,
};
pub use selection::{elites, select_parents, SelectionType};
