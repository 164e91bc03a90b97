//! Permutation-preserving crossover and mutation.
//!
//! Operators act on rule orders (`&[String]`); identity assignment and
//! fitness reset are the engine's job. Runtime strategy selection goes
//! through [`GeneticOperators`].
//!
//! # Reference
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains" (OX)
//! - Goldberg & Lingle (1985), "Alleles, Loci and the TSP" (PMX)

use std::collections::{HashMap, HashSet};

use rand::Rng;

/// Crossover strategy for rule-order genomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverType {
    /// Order crossover: contiguous slice from parent 1, rest from
    /// parent 2 in relative order.
    OX,
    /// Partially-mapped crossover (Goldberg & Lingle, 1985).
    PMX,
}

/// Mutation strategy for rule-order genomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    /// Swap two random positions.
    Swap,
    /// Reverse a random contiguous segment. With the segment spanning the
    /// whole order this degenerates to the classic full reversal used for
    /// baseline exploration.
    Invert,
}

/// Runtime-selectable genetic operators.
///
/// Lets an experiment switch strategies via configuration without
/// changing the engine.
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Mutation strategy.
    pub mutation_type: MutationType,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_type: CrossoverType::OX,
            mutation_type: MutationType::Swap,
        }
    }
}

impl GeneticOperators {
    /// Produces a child order using the configured crossover.
    pub fn crossover<R: Rng>(&self, p1: &[String], p2: &[String], rng: &mut R) -> Vec<String> {
        match self.crossover_type {
            CrossoverType::OX => order_crossover(p1, p2, rng),
            CrossoverType::PMX => pmx_crossover(p1, p2, rng),
        }
    }

    /// Mutates an order in place using the configured strategy.
    pub fn mutate<R: Rng>(&self, order: &mut [String], rng: &mut R) {
        match self.mutation_type {
            MutationType::Swap => swap_mutation(order, rng),
            MutationType::Invert => invert_mutation(order, rng),
        }
    }
}

/// Picks a random segment `start..=end` with `start <= end`.
fn random_segment<R: Rng>(len: usize, rng: &mut R) -> (usize, usize) {
    let mut start = rng.random_range(0..len);
    let mut end = rng.random_range(0..len);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }
    (start, end)
}

/// Order crossover (OX): copies a contiguous slice from `p1`, fills the
/// remaining positions with `p2`'s rules in their relative order.
pub fn order_crossover<R: Rng>(p1: &[String], p2: &[String], rng: &mut R) -> Vec<String> {
    let len = p1.len();
    if len < 2 {
        return p1.to_vec();
    }
    let (start, end) = random_segment(len, rng);
    let slice: HashSet<&str> = p1[start..=end].iter().map(String::as_str).collect();

    let mut child = vec![String::new(); len];
    child[start..=end].clone_from_slice(&p1[start..=end]);

    let mut donor = p2.iter().filter(|r| !slice.contains(r.as_str()));
    for (i, slot) in child.iter_mut().enumerate() {
        if i >= start && i <= end {
            continue;
        }
        if let Some(rule) = donor.next() {
            *slot = rule.clone();
        }
    }
    child
}

/// Partially-mapped crossover (PMX): copies a slice from `p1` and places
/// `p2`'s displaced rules via the slice's position mapping, keeping every
/// rule exactly once.
pub fn pmx_crossover<R: Rng>(p1: &[String], p2: &[String], rng: &mut R) -> Vec<String> {
    let len = p1.len();
    if len < 2 {
        return p1.to_vec();
    }
    let (start, end) = random_segment(len, rng);
    let p2_pos: HashMap<&str, usize> = p2
        .iter()
        .enumerate()
        .map(|(i, rule)| (rule.as_str(), i))
        .collect();
    let slice: HashSet<&str> = p1[start..=end].iter().map(String::as_str).collect();

    let mut child: Vec<Option<String>> = vec![None; len];
    for i in start..=end {
        child[i] = Some(p1[i].clone());
    }

    // Place each displaced p2 rule by following the mapping chain out of
    // the copied slice.
    for i in start..=end {
        let rule = &p2[i];
        if slice.contains(rule.as_str()) {
            continue;
        }
        let mut pos = i;
        loop {
            match p2_pos.get(p1[pos].as_str()) {
                Some(&next) if next >= start && next <= end => pos = next,
                Some(&next) => {
                    pos = next;
                    break;
                }
                None => break,
            }
        }
        if child[pos].is_none() {
            child[pos] = Some(rule.clone());
        }
    }

    // Remaining positions inherit from p2 directly.
    child
        .into_iter()
        .enumerate()
        .map(|(i, slot)| slot.unwrap_or_else(|| p2[i].clone()))
        .collect()
}

/// Swap mutation: exchanges two random positions.
pub fn swap_mutation<R: Rng>(order: &mut [String], rng: &mut R) {
    let len = order.len();
    if len < 2 {
        return;
    }
    let i = rng.random_range(0..len);
    let j = rng.random_range(0..len);
    order.swap(i, j);
}

/// Invert mutation: reverses a random contiguous segment.
pub fn invert_mutation<R: Rng>(order: &mut [String], rng: &mut R) {
    let len = order.len();
    if len < 2 {
        return;
    }
    let (start, end) = random_segment(len, rng);
    order[start..=end].reverse();
}
