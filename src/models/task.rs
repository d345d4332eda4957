//! Task model.
//!
//! A task is an indivisible unit of work with a fixed length, assigned
//! to exactly one machine.

use serde::{Deserialize, Serialize};

/// Task identifier, unique within a run.
pub type TaskId = u32;

/// A task to be placed on a machine.
///
/// # Units
/// `length` is measured in abstract work units; a machine processes
/// `speed` work units per time unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Workload length (work units, > 0).
    pub length: u64,
}

impl Task {
    /// Creates a task.
    pub fn new(id: TaskId, length: u64) -> Self {
        Self { id, length }
    }

    /// Time this task occupies a machine running at `speed`.
    pub fn duration_on(&self, speed: f64) -> f64 {
        self.length as f64 / speed
    }
}
