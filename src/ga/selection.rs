//! Parent selection and elitism.
//!
//! All policies rank by ascending fitness (lower = better) and break ties
//! by `individual_id`, so a fixed RNG seed gives a deterministic search.
//! Unevaluated individuals never enter selection.

use rand::Rng;

use crate::models::{Individual, Population};

/// Parent selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionType {
    /// Best of a random tournament of configured size.
    Tournament,
    /// Linear rank-based sampling: weight `n - rank` for rank 0..n.
    Rank,
}

/// Selects `count` parents from the evaluated members of `population`.
///
/// Parents may repeat; the pool is sampled with replacement. Returns an
/// empty vec when the population has no evaluated members.
pub fn select_parents<'a, R: Rng>(
    population: &'a Population,
    count: usize,
    policy: SelectionType,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<&'a Individual> {
    let ranked = population.ranked();
    if ranked.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|_| match policy {
            SelectionType::Tournament => tournament_pick(&ranked, tournament_size, rng),
            SelectionType::Rank => rank_pick(&ranked, rng),
        })
        .collect()
}

/// Clones the `count` best evaluated individuals, fitness intact.
///
/// These are carried unmodified into the next generation before breeding
/// fills the remaining slots.
pub fn elites(population: &Population, count: usize) -> Vec<Individual> {
    population
        .ranked()
        .into_iter()
        .take(count)
        .cloned()
        .collect()
}

/// Best contestant of a random tournament of distinct members.
///
/// `ranked` is sorted ascending, so the winner is simply the contestant
/// with the smallest index.
fn tournament_pick<'a, R: Rng>(
    ranked: &[&'a Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual {
    let size = tournament_size.clamp(1, ranked.len());
    let winner = rand::seq::index::sample(rng, ranked.len(), size)
        .into_iter()
        .min()
        .unwrap_or(0);
    ranked[winner]
}

/// Linear rank-based pick: rank 0 (the best) has weight `n`, the worst
/// has weight 1.
fn rank_pick<'a, R: Rng>(ranked: &[&'a Individual], rng: &mut R) -> &'a Individual {
    let n = ranked.len();
    let total: usize = n * (n + 1) / 2;
    let mut ticket = rng.random_range(0..total);
    for (rank, individual) in ranked.iter().enumerate() {
        let weight = n - rank;
        if ticket < weight {
            return individual;
        }
        ticket -= weight;
    }
    ranked[n - 1]
}
