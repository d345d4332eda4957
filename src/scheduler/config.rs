//! Optimizer configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::ga::{StrategyKind, check_probability};
use crate::repair::ExhaustionPolicy;

/// Tunables for one optimization run.
///
/// # Example
///
/// ```
/// use u_makespan::scheduler::OptimizerConfig;
/// use u_makespan::ga::StrategyKind;
///
/// let config = OptimizerConfig::genetic()
///     .with_population_size(10)
///     .with_seed(42)
///     .with_parallel(false);
/// assert_eq!(config.strategy, StrategyKind::Genetic);
/// assert_eq!(config.effective_generations(), 40);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Variation strategy.
    pub strategy: StrategyKind,
    /// Number of candidates kept per generation (default: 20).
    pub population_size: usize,
    /// Generation budget. `None` uses the strategy default
    /// (pollination: 100, genetic: 40).
    pub generations: Option<usize>,
    /// Probability of local pollination per candidate (default: 0.8).
    pub local_probability: f64,
    /// Probability of swap mutation per candidate (default: 0.5).
    pub mutation_probability: f64,
    /// Extra tasks allowed per machine above the even split (default: 1).
    pub capacity_slack: usize,
    /// RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Score candidate batches on the rayon pool.
    pub parallel: bool,
    /// Wall-clock budget, checked between generations.
    pub time_limit: Option<Duration>,
    /// Behaviour when repair finds every machine at capacity.
    pub exhaustion_policy: ExhaustionPolicy,
    /// Where to save the final population, if anywhere.
    pub checkpoint_out: Option<PathBuf>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            population_size: 20,
            generations: None,
            local_probability: 0.8,
            mutation_probability: 0.5,
            capacity_slack: 1,
            seed: None,
            parallel: true,
            time_limit: None,
            exhaustion_policy: ExhaustionPolicy::default(),
            checkpoint_out: None,
        }
    }
}

impl OptimizerConfig {
    /// Default configuration for pollination search.
    pub fn pollination() -> Self {
        Self::default().with_strategy(StrategyKind::Pollination)
    }

    /// Default configuration for genetic search.
    pub fn genetic() -> Self {
        Self::default().with_strategy(StrategyKind::Genetic)
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation budget.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = Some(generations);
        self
    }

    /// Sets the local-pollination probability.
    pub fn with_local_probability(mut self, p: f64) -> Self {
        self.local_probability = p;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p;
        self
    }

    /// Sets the capacity slack.
    pub fn with_capacity_slack(mut self, slack: usize) -> Self {
        self.capacity_slack = slack;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the exhaustion policy.
    pub fn with_exhaustion_policy(mut self, policy: ExhaustionPolicy) -> Self {
        self.exhaustion_policy = policy;
        self
    }

    /// Saves the final population to `path` on completion.
    pub fn with_checkpoint_out(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_out = Some(path.into());
        self
    }

    /// Generation budget after applying the strategy default.
    pub fn effective_generations(&self) -> usize {
        self.generations
            .unwrap_or_else(|| self.strategy.default_generations())
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidConfig`] for a zero population size or a
    /// probability outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(SchedulingError::InvalidConfig(
                "population_size must be at least 1".into(),
            ));
        }
        check_probability("local_probability", self.local_probability)?;
        check_probability("mutation_probability", self.mutation_probability)
    }
}
