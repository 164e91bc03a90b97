//! Population model.
//!
//! An ordered collection of individuals sharing a `population_id` and a
//! generation counter. Created once per experiment and mutated in place
//! across generations.

use serde::{Deserialize, Serialize};

use super::Individual;

/// The set of individuals under evolution in one generation.
///
/// Invariant: all members share the same rule count. Ranking is by
/// ascending fitness (lower = better), ties broken by `individual_id`
/// so runs with a fixed seed are deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    /// Experiment-wide identifier, shared by all members.
    pub population_id: u32,
    /// Completed evaluate→select→breed cycles.
    pub generation: u32,
    /// Current members.
    pub individuals: Vec<Individual>,
}

impl Population {
    /// Creates generation zero from the seed individuals.
    pub fn new(population_id: u32, individuals: Vec<Individual>) -> Self {
        Self {
            population_id,
            generation: 0,
            individuals,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// True when the population has no members.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Shared rule count, or `None` for an empty population.
    pub fn rule_count(&self) -> Option<usize> {
        self.individuals.first().map(Individual::rule_count)
    }

    /// True when every member has a fitness value.
    ///
    /// Selection must not start until this holds — the evaluating phase
    /// is a synchronization barrier.
    pub fn all_evaluated(&self) -> bool {
        self.individuals.iter().all(|i| i.fitness.is_some())
    }

    /// Best evaluated member: lowest fitness, ties broken by id.
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .filter(|i| i.fitness.is_some())
            .min_by(|a, b| {
                let fa = a.fitness.unwrap_or(f64::INFINITY);
                let fb = b.fitness.unwrap_or(f64::INFINITY);
                fa.total_cmp(&fb)
                    .then_with(|| a.individual_id.cmp(&b.individual_id))
            })
    }

    /// Members ranked by ascending fitness, unevaluated members excluded.
    pub fn ranked(&self) -> Vec<&Individual> {
        let mut ranked: Vec<&Individual> = self
            .individuals
            .iter()
            .filter(|i| i.fitness.is_some())
            .collect();
        ranked.sort_by(|a, b| {
            let fa = a.fitness.unwrap_or(f64::INFINITY);
            let fb = b.fitness.unwrap_or(f64::INFINITY);
            fa.total_cmp(&fb)
                .then_with(|| a.individual_id.cmp(&b.individual_id))
        });
        ranked
    }

    /// Records a fitness value for the member with the given id.
    ///
    /// Returns false if no such member exists.
    pub fn set_fitness(&mut self, individual_id: u32, fitness: f64) -> bool {
        match self
            .individuals
            .iter_mut()
            .find(|i| i.individual_id == individual_id)
        {
            Some(individual) => {
                individual.fitness = Some(fitness);
                true
            }
            None => false,
        }
    }

    /// Replaces the members with the next generation and increments the
    /// generation counter.
    pub fn advance(&mut self, next_generation: Vec<Individual>) {
        self.individuals = next_generation;
        self.generation += 1;
    }
}
