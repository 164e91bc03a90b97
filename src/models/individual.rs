//! Individual (genome) model.
//!
//! One candidate solution: a permutation of the any-phase rule set plus
//! the fitness it earned, if any. Lower fitness = better (total synthesis
//! time in seconds).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::RuleSet;

/// One candidate rule order under evolution.
///
/// The `(population_id, individual_id)` pair names every artifact the
/// individual produces (genome file, telemetry, stats), so it must be
/// unique across concurrent evaluations.
///
/// `fitness` is `None` until the evaluator reports; operators always
/// produce children with fitness unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Experiment-wide population identifier.
    pub population_id: u32,
    /// Identifier unique within the population, across all generations.
    pub individual_id: u32,
    /// Permutation of the any-phase rule set.
    pub rule_order: Vec<String>,
    /// Aggregated fitness (seconds, lower = better); `None` = unevaluated.
    pub fitness: Option<f64>,
}

impl Individual {
    /// Creates an unevaluated individual with the given order.
    pub fn new(population_id: u32, individual_id: u32, rule_order: Vec<String>) -> Self {
        Self {
            population_id,
            individual_id,
            rule_order,
            fitness: None,
        }
    }

    /// Creates an individual carrying the rule set's default order.
    pub fn from_default_order(population_id: u32, individual_id: u32, rules: &RuleSet) -> Self {
        Self::new(population_id, individual_id, rules.default_order().to_vec())
    }

    /// Creates an individual with a uniformly random permutation.
    pub fn random<R: Rng>(
        population_id: u32,
        individual_id: u32,
        rules: &RuleSet,
        rng: &mut R,
    ) -> Self {
        let mut order = rules.default_order().to_vec();
        order.shuffle(rng);
        Self::new(population_id, individual_id, order)
    }

    /// Creates an unevaluated copy with this order reversed.
    ///
    /// The reversal of the default order is the classic second seed for
    /// baseline exploration.
    pub fn reversed(&self, individual_id: u32) -> Self {
        let mut order = self.rule_order.clone();
        order.reverse();
        Self::new(self.population_id, individual_id, order)
    }

    /// Number of any-phase rules in this genome.
    ///
    /// Derived from the order itself so it can never disagree with it.
    pub fn rule_count(&self) -> usize {
        self.rule_order.len()
    }

    /// True when this order is a permutation of `rules` (no duplicates,
    /// no omissions, no foreign identifiers).
    pub fn is_permutation_of(&self, rules: &RuleSet) -> bool {
        if self.rule_order.len() != rules.len() {
            return false;
        }
        let mut seen = HashSet::new();
        self.rule_order
            .iter()
            .all(|r| rules.contains(r) && seen.insert(r.as_str()))
    }
}
