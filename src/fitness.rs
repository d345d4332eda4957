//! Makespan fitness evaluation.
//!
//! A machine's completion time is the summed length of its bucket
//! divided by its speed. The fitness of an assignment is the largest
//! completion time (C_max). Lower is better.
//!
//! Evaluation is a pure function of the assignment and the immutable
//! [`Workload`], so batches can be scored in parallel without locking.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 2: Makespan on uniform parallel machines (Q||C_max)

use rayon::prelude::*;

use crate::models::{Assignment, TaskId, Workload};

/// Scores assignments against one workload.
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluator<'a> {
    workload: &'a Workload,
}

impl<'a> FitnessEvaluator<'a> {
    /// Creates an evaluator for `workload`.
    pub fn new(workload: &'a Workload) -> Self {
        Self { workload }
    }

    /// The workload being scored against.
    pub fn workload(&self) -> &'a Workload {
        self.workload
    }

    /// Completion time of one bucket on `machine`.
    ///
    /// IDs unknown to the workload contribute nothing.
    pub fn bucket_time(&self, machine: usize, bucket: &[TaskId]) -> f64 {
        self.load_time(machine, self.bucket_load(bucket))
    }

    /// Summed task length of one bucket; unknown IDs count as zero.
    pub fn bucket_load(&self, bucket: &[TaskId]) -> u64 {
        bucket
            .iter()
            .filter_map(|&id| self.workload.length_of(id))
            .sum()
    }

    /// Per-machine summed task lengths, indexed by machine.
    pub fn bucket_loads(&self, assignment: &Assignment) -> Vec<u64> {
        assignment
            .buckets
            .iter()
            .map(|bucket| self.bucket_load(bucket))
            .collect()
    }

    /// Completion time of `load` work units on `machine`.
    ///
    /// Repair and scoring share this division; equal loads on equal
    /// speeds compare equal.
    pub fn load_time(&self, machine: usize, load: u64) -> f64 {
        match self.workload.speed_of(machine) {
            Some(speed) => load as f64 / speed,
            None => 0.0,
        }
    }

    /// Per-machine completion times, indexed by machine.
    pub fn completion_times(&self, assignment: &Assignment) -> Vec<f64> {
        assignment
            .buckets
            .iter()
            .enumerate()
            .map(|(machine, bucket)| self.bucket_time(machine, bucket))
            .collect()
    }

    /// Makespan of `assignment` (0.0 if every bucket is empty).
    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        assignment
            .buckets
            .iter()
            .enumerate()
            .map(|(machine, bucket)| self.bucket_time(machine, bucket))
            .fold(0.0, f64::max)
    }

    /// Scores a batch, preserving input order.
    ///
    /// With `parallel` set, candidates are scored on the rayon pool.
    pub fn evaluate_batch(&self, assignments: &[Assignment], parallel: bool) -> Vec<f64> {
        if parallel {
            assignments.par_iter().map(|a| self.evaluate(a)).collect()
        } else {
            assignments.iter().map(|a| self.evaluate(a)).collect()
        }
    }
}
