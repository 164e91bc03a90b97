//! The generational evolution engine (population manager).
//!
//! Owns the population and drives the cycle
//! `Initializing → Evaluating → Selecting → Breeding → … → Terminated`.
//!
//! # Phases
//!
//! - **Initializing**: seed the population with the default order, its
//!   reversal, and random permutations.
//! - **Evaluating**: write every unevaluated member's genome file and run
//!   the fitness evaluator; this phase is a synchronization barrier — no
//!   ranking happens until every member has a report.
//! - **Selecting**: rank, update the best-ever individual, check
//!   convergence.
//! - **Breeding**: carry elites unmodified, fill the remaining slots via
//!   selection + crossover + mutation, increment the generation counter.
//! - **Terminated**: generation budget exhausted or fitness improvement
//!   stayed below the convergence threshold long enough. The reported
//!   result is the best individual ever observed, across all generations.
//!
//! A member whose genome fails validation is dropped and replaced with a
//! fresh random permutation; only structural failures (unwritable genome
//! store, unlaunchable synthesizer) abort the experiment.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::codec::GenomeCodec;
use crate::config::EvolutionConfig;
use crate::error::TunerError;
use crate::evaluation::FitnessEvaluator;
use crate::ga::{elites, select_parents, GeneticOperators, SelectionType};
use crate::models::{Individual, Population};

/// State of the generational loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructing the seed population.
    Initializing,
    /// Waiting for every member's fitness report.
    Evaluating,
    /// Ranking and convergence bookkeeping.
    Selecting,
    /// Producing the next generation.
    Breeding,
    /// Final state; the outcome has been produced.
    Terminated,
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// `max_generations` evaluated generations completed.
    GenerationBudgetExhausted,
    /// Best fitness improved less than the epsilon for
    /// `convergence_patience` consecutive generations.
    Converged,
}

/// Final result of one tuning experiment.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// Best individual ever observed, across all generations.
    pub best: Individual,
    /// The last generation, fully evaluated and ranked.
    pub final_population: Population,
    /// Number of evaluated generations.
    pub generations_run: u32,
    /// Why the loop stopped.
    pub reason: TerminationReason,
}

/// Drives the evolutionary search.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    codec: GenomeCodec,
    evaluator: Arc<FitnessEvaluator>,
    operators: GeneticOperators,
    selection: SelectionType,
    rng: SmallRng,
    population_id: u32,
    next_individual_id: u32,
    phase: Phase,
    best_ever: Option<Individual>,
}

impl EvolutionEngine {
    /// Creates an engine over a codec and an evaluator.
    pub fn new(
        codec: GenomeCodec,
        evaluator: Arc<FitnessEvaluator>,
        config: EvolutionConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            config,
            codec,
            evaluator,
            operators: GeneticOperators::default(),
            selection: SelectionType::Tournament,
            rng,
            population_id: 0,
            next_individual_id: 0,
            phase: Phase::Initializing,
            best_ever: None,
        }
    }

    /// Sets the genetic operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Sets the selection policy.
    pub fn with_selection(mut self, selection: SelectionType) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the population id used to name artifacts.
    pub fn with_population_id(mut self, population_id: u32) -> Self {
        self.population_id = population_id;
        self
    }

    /// Current phase of the loop.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Best individual observed so far, if any generation has completed.
    pub fn best_ever(&self) -> Option<&Individual> {
        self.best_ever.as_ref()
    }

    /// Runs the experiment to termination.
    ///
    /// Always finishes with either a ranked final population and best
    /// individual, or an explicit abort reason.
    pub async fn run(&mut self) -> Result<EvolutionOutcome, TunerError> {
        self.validate_config()?;

        self.phase = Phase::Initializing;
        let mut population = self.seed_population();
        info!(
            population_id = self.population_id,
            size = population.len(),
            rules = self.codec.rule_set().len(),
            "seeded population"
        );

        let mut stale_generations = 0u32;
        let mut reason = TerminationReason::GenerationBudgetExhausted;

        for generation in 0..self.config.max_generations {
            self.phase = Phase::Evaluating;
            self.prepare_genomes(&mut population)?;
            self.evaluator.evaluate_population(&mut population).await?;

            self.phase = Phase::Selecting;
            let previous_best = self.best_ever.as_ref().and_then(|b| b.fitness);
            if let Some(best) = population.best() {
                let improved = previous_best
                    .map(|p| best.fitness.unwrap_or(f64::INFINITY) < p)
                    .unwrap_or(true);
                if improved {
                    self.best_ever = Some(best.clone());
                }
            }
            let current_best = self.best_ever.as_ref().and_then(|b| b.fitness);
            let improvement = match (previous_best, current_best) {
                (Some(previous), Some(current)) => previous - current,
                _ => f64::INFINITY,
            };
            info!(
                generation,
                best = current_best.unwrap_or(f64::INFINITY),
                improvement,
                "generation evaluated"
            );

            if improvement < self.config.convergence_epsilon {
                stale_generations += 1;
            } else {
                stale_generations = 0;
            }
            if stale_generations >= self.config.convergence_patience {
                reason = TerminationReason::Converged;
                break;
            }
            if generation + 1 == self.config.max_generations {
                break;
            }

            self.phase = Phase::Breeding;
            let next_generation = self.breed(&population);
            population.advance(next_generation);
        }

        self.phase = Phase::Terminated;
        let best = self.best_ever.clone().ok_or_else(|| {
            TunerError::EvaluationLost("no individual was ever evaluated".into())
        })?;
        info!(
            best_fitness = best.fitness.unwrap_or(f64::INFINITY),
            generations = population.generation + 1,
            ?reason,
            "search terminated"
        );
        Ok(EvolutionOutcome {
            best,
            generations_run: population.generation + 1,
            final_population: population,
            reason,
        })
    }

    fn validate_config(&self) -> Result<(), TunerError> {
        if self.codec.rule_set().is_empty() {
            return Err(TunerError::InvalidConfig("rule set is empty".into()));
        }
        if self.config.population_size < 2 {
            return Err(TunerError::InvalidConfig(
                "population size must be at least 2".into(),
            ));
        }
        if self.config.elite_count == 0 || self.config.elite_count >= self.config.population_size {
            return Err(TunerError::InvalidConfig(
                "elite count must be in 1..population_size".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.config.crossover_rate)
            || !(0.0..=1.0).contains(&self.config.mutation_rate)
        {
            return Err(TunerError::InvalidConfig(
                "crossover and mutation rates must be within 0.0..=1.0".into(),
            ));
        }
        if self.config.tournament_size == 0 {
            return Err(TunerError::InvalidConfig(
                "tournament size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_individual_id;
        self.next_individual_id += 1;
        id
    }

    /// Seed: the default order, its reversal, then random permutations.
    fn seed_population(&mut self) -> Population {
        let rules = self.codec.rule_set().clone();
        let default_id = self.next_id();
        let default = Individual::from_default_order(self.population_id, default_id, &rules);
        let reversed_id = self.next_id();
        let reversed = default.reversed(reversed_id);

        let mut individuals = vec![default, reversed];
        while individuals.len() < self.config.population_size {
            let id = self.next_id();
            individuals.push(Individual::random(
                self.population_id,
                id,
                &rules,
                &mut self.rng,
            ));
        }
        Population::new(self.population_id, individuals)
    }

    /// Writes genome files for every unevaluated member.
    ///
    /// A member failing validation is replaced with a fresh random
    /// permutation; I/O failures abort.
    fn prepare_genomes(&mut self, population: &mut Population) -> Result<(), TunerError> {
        let rules = self.codec.rule_set().clone();
        for index in 0..population.individuals.len() {
            if population.individuals[index].fitness.is_some() {
                continue;
            }
            if let Err(error) = self.codec.encode(&population.individuals[index]) {
                if !error.is_malformed_genome() {
                    return Err(error.into());
                }
                warn!(
                    individual = population.individuals[index].individual_id,
                    %error,
                    "dropping malformed individual, breeding replacement"
                );
                let id = self.next_id();
                let replacement =
                    Individual::random(self.population_id, id, &rules, &mut self.rng);
                self.codec.encode(&replacement)?;
                population.individuals[index] = replacement;
            }
        }
        Ok(())
    }

    /// Elites carry over unmodified; crossover + mutation fill the rest.
    fn breed(&mut self, population: &Population) -> Vec<Individual> {
        let rules = self.codec.rule_set().clone();
        let mut next = elites(population, self.config.elite_count);
        debug!(
            elites = next.len(),
            generation = population.generation,
            "breeding next generation"
        );

        while next.len() < self.config.population_size {
            let parents = select_parents(
                population,
                2,
                self.selection,
                self.config.tournament_size,
                &mut self.rng,
            );
            let mut order = match parents.as_slice() {
                [first, second] if self.rng.random_bool(self.config.crossover_rate) => self
                    .operators
                    .crossover(&first.rule_order, &second.rule_order, &mut self.rng),
                [first, ..] => first.rule_order.clone(),
                [] => rules.default_order().to_vec(),
            };
            if self.rng.random_bool(self.config.mutation_rate) {
                self.operators.mutate(&mut order, &mut self.rng);
            }
            let id = self.next_id();
            next.push(Individual::new(self.population_id, id, order));
        }
        next
    }
}
