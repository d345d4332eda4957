//! Population-based variation strategies.
//!
//! Two strategies share the same bucket encoding, repair, and fitness,
//! and differ only in how a generation produces and selects candidates:
//!
//! - [`PollinationStrategy`]: per-slot segment recombination with a
//!   random member (local) or the best-known solution (global), replacing
//!   a slot only when the child beats it.
//! - [`GeneticStrategy`]: all-pairs crossover, swap mutation over the
//!   extended population, then truncation to the best `N`.
//!
//! Both implement [`VariationStrategy`]; the runtime-selectable
//! [`Strategy`] enum wraps either one for configuration-driven runs.
//!
//! # Submodules
//!
//! - [`operators`]: segment crossover and swap mutation
//!
//! # Reference
//! - Yang (2012), "Flower Pollination Algorithm for Global Optimization"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"

mod genetic;
pub mod operators;
mod pollination;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::fitness::FitnessEvaluator;
use crate::models::Assignment;
use crate::repair::Repairer;

pub use genetic::{GeneticStrategy, fitness_ratios};
pub use operators::{pollinate, random_cut, segment_crossover, swap_mutation};
pub use pollination::PollinationStrategy;

/// A scored assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The assignment.
    pub assignment: Assignment,
    /// Its makespan (lower = better).
    pub fitness: f64,
}

/// Mutable search state carried across generations.
#[derive(Debug, Clone)]
pub struct SearchState {
    /// Current population, one candidate per slot.
    pub population: Vec<Candidate>,
    /// Best candidate seen so far; replaced only on strict improvement.
    pub best: Candidate,
}

impl SearchState {
    /// Builds the state from scored members, picking the first lowest
    /// fitness as the initial best.
    ///
    /// Returns `None` for an empty population.
    pub fn new(population: Vec<Candidate>) -> Option<Self> {
        let best = population
            .iter()
            .fold(None::<&Candidate>, |best, c| match best {
                Some(b) if b.fitness <= c.fitness => Some(b),
                _ => Some(c),
            })?
            .clone();
        Some(Self { population, best })
    }

    /// Replaces the best-known candidate if `candidate` is strictly better.
    pub fn offer_best(&mut self, candidate: &Candidate) -> bool {
        if candidate.fitness < self.best.fitness {
            self.best = candidate.clone();
            true
        } else {
            false
        }
    }
}

/// Shared, read-only services for one generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    /// Scores candidates.
    pub evaluator: FitnessEvaluator<'a>,
    /// Restores feasibility after recombination.
    pub repairer: Repairer<'a>,
    /// Score batches on the rayon pool.
    pub parallel: bool,
}

impl GenerationContext<'_> {
    /// Repairs a child in place, verifies it, and returns the number of
    /// over-capacity placements.
    pub fn repair(&self, child: &mut Assignment) -> Result<usize> {
        let report = self.repairer.repair(child)?;
        self.repairer.check(child)?;
        Ok(report.exhausted.len())
    }

    /// Repairs and scores a child.
    pub fn finish(&self, mut child: Assignment, stats: &mut GenerationStats) -> Result<Candidate> {
        stats.repair_exhausted += self.repair(&mut child)?;
        stats.candidates += 1;
        let fitness = self.evaluator.evaluate(&child);
        Ok(Candidate {
            assignment: child,
            fitness,
        })
    }
}

/// Counters for one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Children produced.
    pub candidates: usize,
    /// Population slots whose resident changed for the better.
    pub improved_slots: usize,
    /// Tasks placed over capacity during repair.
    pub repair_exhausted: usize,
    /// Whether the best-known candidate improved.
    pub best_improved: bool,
}

/// Checks that `p` lies within `[0, 1]`.
///
/// # Errors
/// [`SchedulingError::InvalidConfig`] naming the offending parameter.
pub fn check_probability(name: &str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(SchedulingError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {p}"
        )))
    }
}

/// A way of turning one generation's population into the next.
pub trait VariationStrategy {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Checks the strategy's own parameters before a run.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Runs one generation, updating `state` in place.
    ///
    /// Must leave every population member feasible and must never
    /// replace `state.best` with a worse candidate.
    fn generation<R: Rng>(
        &mut self,
        state: &mut SearchState,
        ctx: &GenerationContext<'_>,
        rng: &mut R,
    ) -> Result<GenerationStats>;
}

/// Strategy selector for configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Local/global pollination with replace-if-better.
    #[default]
    Pollination,
    /// Pairwise crossover, mutation, truncation elitism.
    Genetic,
}

impl StrategyKind {
    /// Generation budget used when none is configured.
    pub fn default_generations(self) -> usize {
        match self {
            StrategyKind::Pollination => 100,
            StrategyKind::Genetic => 40,
        }
    }
}

/// Runtime-selectable strategy.
///
/// # Example
///
/// ```
/// use u_makespan::ga::{Strategy, StrategyKind, VariationStrategy};
///
/// let strategy = Strategy::from_kind(StrategyKind::Genetic, 0.8, 0.5);
/// assert_eq!(strategy.name(), "genetic");
/// ```
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Pollination search.
    Pollination(PollinationStrategy),
    /// Genetic search.
    Genetic(GeneticStrategy),
}

impl Strategy {
    /// Builds the strategy for `kind` with the given operator probabilities.
    pub fn from_kind(kind: StrategyKind, local_probability: f64, mutation_probability: f64) -> Self {
        match kind {
            StrategyKind::Pollination => {
                Strategy::Pollination(PollinationStrategy::new(local_probability))
            }
            StrategyKind::Genetic => Strategy::Genetic(GeneticStrategy::new(mutation_probability)),
        }
    }

    /// The kind this strategy was built from.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Pollination(_) => StrategyKind::Pollination,
            Strategy::Genetic(_) => StrategyKind::Genetic,
        }
    }
}

impl VariationStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Pollination(s) => s.name(),
            Strategy::Genetic(s) => s.name(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Strategy::Pollination(s) => s.validate(),
            Strategy::Genetic(s) => s.validate(),
        }
    }

    fn generation<R: Rng>(
        &mut self,
        state: &mut SearchState,
        ctx: &GenerationContext<'_>,
        rng: &mut R,
    ) -> Result<GenerationStats> {
        match self {
            Strategy::Pollination(s) => s.generation(state, ctx, rng),
            Strategy::Genetic(s) => s.generation(state, ctx, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Workload;
    use crate::repair::ExhaustionPolicy;

    fn candidate(fitness: f64) -> Candidate {
        Candidate {
            assignment: Assignment::empty(1),
            fitness,
        }
    }

    #[test]
    fn test_search_state_picks_first_best() {
        let mut a = candidate(3.0);
        a.assignment.buckets[0].push(1);
        let mut b = candidate(3.0);
        b.assignment.buckets[0].push(2);
        let state = SearchState::new(vec![candidate(5.0), a.clone(), b]).unwrap();
        assert_eq!(state.best, a);
    }

    #[test]
    fn test_search_state_empty() {
        assert!(SearchState::new(Vec::new()).is_none());
    }

    #[test]
    fn test_offer_best_strict() {
        let mut state = SearchState::new(vec![candidate(4.0)]).unwrap();
        assert!(!state.offer_best(&candidate(4.0)));
        assert!(state.offer_best(&candidate(3.5)));
        assert_eq!(state.best.fitness, 3.5);
    }

    #[test]
    fn test_context_finish_repairs_and_scores() {
        let workload = Workload::from_lengths(&[4, 6], &[1.0, 1.0]).unwrap();
        let ctx = GenerationContext {
            evaluator: FitnessEvaluator::new(&workload),
            repairer: Repairer::new(&workload, workload.capacity(1), ExhaustionPolicy::default()),
            parallel: false,
        };
        let mut stats = GenerationStats::default();
        let child = Assignment::from_buckets(vec![vec![0, 1], vec![1]]);
        let c = ctx.finish(child, &mut stats).unwrap();
        assert_eq!(c.assignment.buckets, vec![vec![0], vec![1]]);
        assert_eq!(c.fitness, 6.0);
        assert_eq!(stats.candidates, 1);
    }

    #[test]
    fn test_strategy_kind_defaults() {
        assert_eq!(StrategyKind::default(), StrategyKind::Pollination);
        assert_eq!(StrategyKind::Pollination.default_generations(), 100);
        assert_eq!(StrategyKind::Genetic.default_generations(), 40);
    }

    #[test]
    fn test_check_probability() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", -0.1).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn test_strategy_validate_delegates() {
        assert!(Strategy::from_kind(StrategyKind::Pollination, 1.5, 0.5).validate().is_err());
        assert!(Strategy::from_kind(StrategyKind::Genetic, 1.5, 0.5).validate().is_ok());
        assert!(Strategy::from_kind(StrategyKind::Genetic, 0.8, 2.0).validate().is_err());
    }

    #[test]
    fn test_strategy_from_kind() {
        let s = Strategy::from_kind(StrategyKind::Pollination, 0.8, 0.5);
        assert_eq!(s.kind(), StrategyKind::Pollination);
        assert_eq!(s.name(), "pollination");
    }
}
