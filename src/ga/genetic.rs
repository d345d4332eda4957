//! Genetic search with truncation elitism.
//!
//! # Generation
//!
//! 1. **Crossover**: every unordered pair `(i, j)` shares one random cut
//!    and yields two repaired children, `cross(i, j)` and `cross(j, i)`.
//!    The extended population holds `N + 2 * C(N, 2)` candidates.
//! 2. **Mutation**: each extended candidate is swap-mutated with
//!    probability `mutation_probability`. Parents are included.
//! 3. **Selection**: the extended population is scored (optionally in
//!    parallel), stably sorted ascending, and truncated to `N`.
//!
//! Fitness-proportional ratios are computed for diagnostics only; they
//! never influence survival.

use rand::Rng;
use tracing::trace;

use super::operators::{random_cut, segment_crossover, swap_mutation};
use super::{
    Candidate, GenerationContext, GenerationStats, SearchState, VariationStrategy, check_probability,
};
use crate::error::Result;
use crate::models::Assignment;

/// All-pairs crossover, swap mutation, truncation selection.
#[derive(Debug, Clone)]
pub struct GeneticStrategy {
    /// Per-candidate mutation probability.
    pub mutation_probability: f64,
}

impl Default for GeneticStrategy {
    fn default() -> Self {
        Self {
            mutation_probability: 0.5,
        }
    }
}

impl GeneticStrategy {
    /// Creates a strategy with the given mutation probability.
    pub fn new(mutation_probability: f64) -> Self {
        Self {
            mutation_probability,
        }
    }

    /// Builds the extended population: parents followed by repaired children.
    fn crossover<R: Rng>(
        &self,
        state: &SearchState,
        ctx: &GenerationContext<'_>,
        stats: &mut GenerationStats,
        rng: &mut R,
    ) -> Result<Vec<Assignment>> {
        let size = state.population.len();
        let machines = state
            .population
            .first()
            .map_or(0, |c| c.assignment.machine_count());

        let mut extended = Vec::with_capacity(size * size);
        extended.extend(state.population.iter().map(|c| c.assignment.clone()));

        for i in 0..size {
            for j in (i + 1)..size {
                let cut = random_cut(machines, rng);
                let a = &state.population[i].assignment;
                let b = &state.population[j].assignment;
                for (first, second) in [(a, b), (b, a)] {
                    let mut child = segment_crossover(first, second, cut);
                    stats.repair_exhausted += ctx.repair(&mut child)?;
                    stats.candidates += 1;
                    extended.push(child);
                }
            }
        }
        Ok(extended)
    }
}

impl VariationStrategy for GeneticStrategy {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn validate(&self) -> Result<()> {
        check_probability("mutation_probability", self.mutation_probability)
    }

    fn generation<R: Rng>(
        &mut self,
        state: &mut SearchState,
        ctx: &GenerationContext<'_>,
        rng: &mut R,
    ) -> Result<GenerationStats> {
        let mut stats = GenerationStats::default();
        let size = state.population.len();

        let current: Vec<f64> = state.population.iter().map(|c| c.fitness).collect();
        trace!(ratios = ?fitness_ratios(&current), "selection ratios");

        let mut extended = self.crossover(state, ctx, &mut stats, rng)?;

        for candidate in &mut extended {
            if rng.random_bool(self.mutation_probability) {
                swap_mutation(candidate, rng);
            }
        }

        let fitness = ctx.evaluator.evaluate_batch(&extended, ctx.parallel);
        let mut order: Vec<usize> = (0..extended.len()).collect();
        order.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));

        let previous: Vec<Assignment> = state
            .population
            .iter()
            .map(|c| c.assignment.clone())
            .collect();
        state.population = order
            .iter()
            .take(size)
            .map(|&k| Candidate {
                assignment: std::mem::take(&mut extended[k]),
                fitness: fitness[k],
            })
            .collect();

        stats.improved_slots = state
            .population
            .iter()
            .filter(|c| !previous.contains(&c.assignment))
            .count();
        if let Some(leader) = state.population.first().cloned() {
            stats.best_improved = state.offer_best(&leader);
        }
        Ok(stats)
    }
}

/// Fitness-proportional ratios `f_i / sum(f)`.
///
/// Diagnostic only. Returns all zeros when the total is zero.
pub fn fitness_ratios(fitness: &[f64]) -> Vec<f64> {
    let total: f64 = fitness.iter().sum();
    if total <= 0.0 {
        return vec![0.0; fitness.len()];
    }
    fitness.iter().map(|f| f / total).collect()
}
