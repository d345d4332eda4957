//! Pollination search.
//!
//! Every generation visits each population slot once. With probability
//! `local_probability` the slot's resident is recombined with another
//! random member (local pollination); otherwise with the best-known
//! solution (global pollination). The repaired child replaces the slot
//! only if strictly better, and independently replaces the best-known
//! only if strictly better.
//!
//! # Reference
//! Yang (2012), "Flower Pollination Algorithm for Global Optimization"

use rand::Rng;

use super::operators::pollinate;
use super::{GenerationContext, GenerationStats, SearchState, VariationStrategy, check_probability};
use crate::error::Result;

/// Local/global pollination with replace-if-better selection.
#[derive(Debug, Clone)]
pub struct PollinationStrategy {
    /// Probability of local (member-to-member) pollination.
    pub local_probability: f64,
}

impl Default for PollinationStrategy {
    fn default() -> Self {
        Self {
            local_probability: 0.8,
        }
    }
}

impl PollinationStrategy {
    /// Creates a strategy with the given local-pollination probability.
    pub fn new(local_probability: f64) -> Self {
        Self { local_probability }
    }

    /// Picks the local partner for `slot` in a population of `size`.
    ///
    /// A draw equal to `slot` is redrawn, except for slot 0, which falls
    /// through to slot 1. A single-member population pairs with itself.
    pub fn pick_partner<R: Rng>(slot: usize, size: usize, rng: &mut R) -> usize {
        loop {
            let partner = rng.random_range(0..size);
            if partner != slot {
                return partner;
            }
            if slot == 0 {
                return if size > 1 { 1 } else { 0 };
            }
        }
    }
}

impl VariationStrategy for PollinationStrategy {
    fn name(&self) -> &'static str {
        "pollination"
    }

    fn validate(&self) -> Result<()> {
        check_probability("local_probability", self.local_probability)
    }

    fn generation<R: Rng>(
        &mut self,
        state: &mut SearchState,
        ctx: &GenerationContext<'_>,
        rng: &mut R,
    ) -> Result<GenerationStats> {
        let mut stats = GenerationStats::default();
        let size = state.population.len();

        for slot in 0..size {
            let flower = &state.population[slot].assignment;
            let child = if rng.random_bool(self.local_probability) {
                let partner = Self::pick_partner(slot, size, rng);
                pollinate(flower, &state.population[partner].assignment, rng)
            } else {
                pollinate(flower, &state.best.assignment, rng)
            };

            let candidate = ctx.finish(child, &mut stats)?;
            if state.offer_best(&candidate) {
                stats.best_improved = true;
            }
            if candidate.fitness < state.population[slot].fitness {
                state.population[slot] = candidate;
                stats.improved_slots += 1;
            }
        }
        Ok(stats)
    }
}
