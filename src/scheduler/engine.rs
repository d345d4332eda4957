//! Generation loop.
//!
//! # Algorithm
//!
//! ```text
//! Init → Evaluate → { Vary → Repair → Evaluate → Select } × generations → Finalize
//! ```
//!
//! 1. **Init**: build the population from a [`PopulationInit`], check each
//!    member against the workload, repair it, and score it. The first
//!    lowest makespan becomes the best-known candidate.
//! 2. **Generations**: the strategy runs one generation at a time. The
//!    cancellation token and time limit are checked before each one; a
//!    generation in progress always completes.
//! 3. **Finalize**: optionally save the final population, then report the
//!    best-known assignment as a `task_id → machine_index` map.

use std::path::PathBuf;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use super::cancel::CancellationToken;
use super::config::OptimizerConfig;
use super::result::{OptimizationResult, TerminationReason};
use crate::checkpoint;
use crate::error::{Result, SchedulingError};
use crate::fitness::FitnessEvaluator;
use crate::ga::{Candidate, GenerationContext, SearchState, Strategy, VariationStrategy};
use crate::models::{Assignment, Population, Workload};
use crate::repair::Repairer;

/// Where the initial population comes from.
#[derive(Debug, Clone, Default)]
pub enum PopulationInit {
    /// Load from a checkpoint file; missing or corrupt files are fatal.
    Checkpoint(PathBuf),
    /// Random capped assignments.
    #[default]
    Random,
    /// Caller-supplied members.
    Provided(Population),
}

/// Population optimizer for one workload.
///
/// # Example
///
/// ```
/// use u_makespan::models::Workload;
/// use u_makespan::scheduler::{Optimizer, OptimizerConfig, PopulationInit};
///
/// let workload = Workload::from_lengths(&[10, 10, 10, 10], &[1.0, 1.0]).unwrap();
/// let config = OptimizerConfig::pollination().with_seed(42).with_parallel(false);
/// let mut optimizer = Optimizer::new(&workload, config).unwrap();
///
/// let result = optimizer.run(PopulationInit::Random).unwrap();
/// assert_eq!(result.mapping.len(), 4);
/// assert!(result.makespan <= 20.0);
/// ```
#[derive(Debug)]
pub struct Optimizer<'a, S = Strategy> {
    workload: &'a Workload,
    config: OptimizerConfig,
    strategy: S,
    cancel: CancellationToken,
}

impl<'a> Optimizer<'a, Strategy> {
    /// Creates an optimizer using the strategy named in `config`.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidConfig`] if `config` fails validation.
    pub fn new(workload: &'a Workload, config: OptimizerConfig) -> Result<Self> {
        let strategy = Strategy::from_kind(
            config.strategy,
            config.local_probability,
            config.mutation_probability,
        );
        Self::with_strategy(workload, config, strategy)
    }
}

impl<'a, S: VariationStrategy> Optimizer<'a, S> {
    /// Creates an optimizer with an explicit strategy.
    ///
    /// `config.strategy` only selects the default generation budget here.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidConfig`] if `config` or the strategy's own
    /// parameters are out of range.
    pub fn with_strategy(workload: &'a Workload, config: OptimizerConfig, strategy: S) -> Result<Self> {
        config.validate()?;
        strategy.validate()?;
        Ok(Self {
            workload,
            config,
            strategy,
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Handle for stopping the run from elsewhere.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The configuration in force.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Per-machine task cap.
    pub fn capacity(&self) -> usize {
        self.workload.capacity(self.config.capacity_slack)
    }

    /// Runs the optimizer with an RNG built from `config.seed`.
    pub fn run(&mut self, init: PopulationInit) -> Result<OptimizationResult> {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.run_with_rng(init, &mut rng)
    }

    /// Runs the optimizer with a caller-supplied RNG.
    ///
    /// # Errors
    /// - Checkpoint and population errors at Init.
    /// - [`SchedulingError::RepairExhausted`] under
    ///   [`ExhaustionPolicy::Fail`](crate::repair::ExhaustionPolicy::Fail).
    /// - [`SchedulingError::Io`] if the final checkpoint cannot be written.
    #[instrument(
        skip_all,
        fields(
            strategy = self.strategy.name(),
            tasks = self.workload.task_count(),
            machines = self.workload.machine_count(),
        )
    )]
    pub fn run_with_rng<R: Rng>(&mut self, init: PopulationInit, rng: &mut R) -> Result<OptimizationResult> {
        let started = Instant::now();
        let generations = self.config.effective_generations();
        let ctx = GenerationContext {
            evaluator: FitnessEvaluator::new(self.workload),
            repairer: Repairer::new(self.workload, self.capacity(), self.config.exhaustion_policy),
            parallel: self.config.parallel,
        };

        let (mut state, mut repair_exhausted) = self.initialize(init, &ctx, rng)?;
        info!(
            population = state.population.len(),
            generations,
            capacity = self.capacity(),
            best = state.best.fitness,
            "optimization started"
        );

        let mut history = Vec::with_capacity(generations + 1);
        history.push(state.best.fitness);
        let mut termination = TerminationReason::Completed;
        let mut completed = 0;

        for generation in 0..generations {
            if self.cancel.is_cancelled() {
                termination = TerminationReason::Cancelled;
                break;
            }
            if self
                .config
                .time_limit
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                termination = TerminationReason::TimeLimit;
                break;
            }

            let stats = self.strategy.generation(&mut state, &ctx, rng)?;
            repair_exhausted += stats.repair_exhausted;
            completed += 1;
            history.push(state.best.fitness);
            debug!(
                generation,
                best = state.best.fitness,
                improved = stats.best_improved,
                improved_slots = stats.improved_slots,
                candidates = stats.candidates,
                "generation complete"
            );
        }

        self.finalize(state, history, completed, termination, repair_exhausted, started)
    }

    fn initialize<R: Rng>(
        &self,
        init: PopulationInit,
        ctx: &GenerationContext<'_>,
        rng: &mut R,
    ) -> Result<(SearchState, usize)> {
        let size = self.config.population_size;
        let machines = self.workload.machine_count();
        let population = match init {
            PopulationInit::Checkpoint(path) => checkpoint::load(&path, size, machines)?,
            PopulationInit::Random => Population::random(self.workload, size, self.capacity(), rng),
            PopulationInit::Provided(population) => {
                if population.len() != size {
                    return Err(SchedulingError::PopulationMismatch(format!(
                        "expected {} members, found {}",
                        size,
                        population.len()
                    )));
                }
                population
            }
        };

        let mut repair_exhausted = 0;
        let mut members = Vec::with_capacity(size);
        for (slot, mut assignment) in population.into_members().into_iter().enumerate() {
            self.check_member(slot, &assignment)?;
            repair_exhausted += ctx.repair(&mut assignment)?;
            members.push(assignment);
        }

        let scores = ctx.evaluator.evaluate_batch(&members, ctx.parallel);
        let candidates = members
            .into_iter()
            .zip(scores)
            .map(|(assignment, fitness)| Candidate { assignment, fitness })
            .collect();
        let state = SearchState::new(candidates)
            .ok_or_else(|| SchedulingError::PopulationMismatch("population is empty".into()))?;
        Ok((state, repair_exhausted))
    }

    fn check_member(&self, slot: usize, assignment: &Assignment) -> Result<()> {
        if assignment.machine_count() != self.workload.machine_count() {
            return Err(SchedulingError::PopulationMismatch(format!(
                "member {} has {} buckets, expected {}",
                slot,
                assignment.machine_count(),
                self.workload.machine_count()
            )));
        }
        if let Some(&id) = assignment
            .buckets
            .iter()
            .flatten()
            .find(|&&id| !self.workload.contains(id))
        {
            return Err(SchedulingError::PopulationMismatch(format!(
                "member {slot} references unknown task {id}"
            )));
        }
        Ok(())
    }

    fn finalize(
        &self,
        state: SearchState,
        history: Vec<f64>,
        generations: usize,
        termination: TerminationReason,
        repair_exhausted: usize,
        started: Instant,
    ) -> Result<OptimizationResult> {
        let population: Population = state
            .population
            .into_iter()
            .map(|c| c.assignment)
            .collect();
        if let Some(path) = &self.config.checkpoint_out {
            checkpoint::save(&population, path)?;
        }

        let best = state.best;
        info!(
            makespan = best.fitness,
            generations,
            ?termination,
            repair_exhausted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "optimization finished"
        );

        Ok(OptimizationResult {
            mapping: best.assignment.to_task_map(),
            makespan: best.fitness,
            best: best.assignment,
            strategy: self.config.strategy,
            generations,
            history,
            termination,
            repair_exhausted,
            population,
        })
    }
}
