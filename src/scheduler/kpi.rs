//! Load-balance quality metrics (KPIs).
//!
//! Computes standard indicators for an assignment on uniform parallel
//! machines.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Largest machine completion time |
//! | Utilization | Completion time / makespan, per machine |
//! | Imbalance | Makespan / mean completion time (1.0 = perfect) |
//! | Lower bound | Total length / total speed (fractional optimum) |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};

use crate::fitness::FitnessEvaluator;
use crate::models::{Assignment, Workload};

/// Load-balance indicators for one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadKpi {
    /// Largest completion time.
    pub makespan: f64,
    /// Completion time per machine.
    pub completion_times: Vec<f64>,
    /// Task count per machine.
    pub task_counts: Vec<usize>,
    /// Completion time / makespan per machine (0.0..1.0).
    pub utilization: Vec<f64>,
    /// Mean utilization.
    pub avg_utilization: f64,
    /// Makespan / mean completion time (>= 1.0).
    pub imbalance: f64,
    /// Makespan if work could be split freely across machines.
    pub lower_bound: f64,
}

impl LoadKpi {
    /// Computes KPIs for `assignment` on `workload`.
    pub fn calculate(workload: &Workload, assignment: &Assignment) -> Self {
        let completion_times = FitnessEvaluator::new(workload).completion_times(assignment);
        let makespan = completion_times.iter().copied().fold(0.0, f64::max);
        let task_counts = assignment.buckets.iter().map(Vec::len).collect();

        let utilization: Vec<f64> = completion_times
            .iter()
            .map(|&t| if makespan > 0.0 { t / makespan } else { 0.0 })
            .collect();
        let avg_utilization = if utilization.is_empty() {
            0.0
        } else {
            utilization.iter().sum::<f64>() / utilization.len() as f64
        };

        let mean = if completion_times.is_empty() {
            0.0
        } else {
            completion_times.iter().sum::<f64>() / completion_times.len() as f64
        };
        let imbalance = if mean > 0.0 { makespan / mean } else { 1.0 };

        let total_speed: f64 = workload.speeds().iter().sum();
        let lower_bound = workload.total_length() as f64 / total_speed;

        Self {
            makespan,
            completion_times,
            task_counts,
            utilization,
            avg_utilization,
            imbalance,
            lower_bound,
        }
    }

    /// Relative distance from the lower bound (0.0 = provably optimal).
    pub fn gap(&self) -> f64 {
        if self.lower_bound > 0.0 {
            self.makespan / self.lower_bound - 1.0
        } else {
            0.0
        }
    }

    /// Whether the assignment meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_imbalance: f64, min_utilization: f64) -> bool {
        self.imbalance <= max_imbalance && self.avg_utilization >= min_utilization
    }
}
