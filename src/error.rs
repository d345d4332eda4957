//! Error types.
//!
//! All fallible operations return [`SchedulingError`]. Input and checkpoint
//! errors surface at optimizer initialization and terminate the run;
//! [`RepairExhausted`] is a warning unless the configured
//! [`ExhaustionPolicy`](crate::repair::ExhaustionPolicy) escalates it.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::TaskId;
use crate::validation::ValidationError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SchedulingError>;

/// Errors raised by the workload model, checkpoint store, and optimizer.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// Zero tasks or zero machines supplied.
    #[error("workload must contain at least one task and one machine (tasks: {tasks}, machines: {machines})")]
    EmptyWorkload { tasks: usize, machines: usize },

    /// Task or machine descriptions failed validation.
    #[error("invalid workload input: {}", format_validation(.0))]
    InvalidInput(Vec<ValidationError>),

    /// Checkpoint file does not exist.
    #[error("checkpoint not found: {}", .path.display())]
    CheckpointMissing { path: PathBuf },

    /// Checkpoint file violates the block/line grammar.
    #[error("corrupt checkpoint at line {line}: {reason}")]
    CheckpointCorrupt { line: usize, reason: String },

    /// Initial population does not fit the workload.
    #[error("population does not match workload: {0}")]
    PopulationMismatch(String),

    /// Optimizer configuration is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Repair could not place a task under capacity and the policy forbids overflow.
    #[error(transparent)]
    RepairExhausted(#[from] RepairExhausted),

    /// A repaired assignment still violates the exactly-once invariant.
    #[error("invalid assignment after repair: {0}")]
    InvalidAssignment(String),

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// No machine had room for an omitted task during repair.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("no machine below capacity {capacity} for task {task_id}; least-loaded machine is {least_loaded}")]
pub struct RepairExhausted {
    /// The task that could not be placed under capacity.
    pub task_id: TaskId,
    /// Per-machine task cap in force.
    pub capacity: usize,
    /// Machine the task falls back to.
    pub least_loaded: usize,
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
