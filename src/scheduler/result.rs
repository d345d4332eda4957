//! Optimization outcome.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::kpi::LoadKpi;
use crate::ga::StrategyKind;
use crate::models::{Assignment, Population, TaskId, Workload};

/// Why the generation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The full generation budget ran.
    Completed,
    /// The cancellation token was set.
    Cancelled,
    /// The wall-clock budget ran out.
    TimeLimit,
}

/// Result of one optimizer run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// `task_id → machine_index` for every task.
    pub mapping: BTreeMap<TaskId, usize>,
    /// Makespan of the best assignment.
    pub makespan: f64,
    /// The best assignment found.
    pub best: Assignment,
    /// Strategy that produced it.
    pub strategy: StrategyKind,
    /// Generations actually completed.
    pub generations: usize,
    /// Best-known makespan after Init, then after each generation.
    pub history: Vec<f64>,
    /// Why the loop stopped.
    pub termination: TerminationReason,
    /// Tasks placed over capacity across all repairs.
    pub repair_exhausted: usize,
    /// Final population in slot order.
    pub population: Population,
}

impl OptimizationResult {
    /// Machine assigned to `task`.
    pub fn machine_of(&self, task: TaskId) -> Option<usize> {
        self.mapping.get(&task).copied()
    }

    /// Makespan reached after Init, before any generation ran.
    pub fn initial_makespan(&self) -> f64 {
        self.history.first().copied().unwrap_or(self.makespan)
    }

    /// Relative makespan reduction over the run (0.0 = none).
    pub fn improvement(&self) -> f64 {
        let initial = self.initial_makespan();
        if initial > 0.0 {
            (initial - self.makespan) / initial
        } else {
            0.0
        }
    }

    /// Load-balance KPIs of the best assignment.
    pub fn kpi(&self, workload: &Workload) -> LoadKpi {
        LoadKpi::calculate(workload, &self.best)
    }
}
