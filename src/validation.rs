//! Input validation for workloads.
//!
//! Checks structural integrity of tasks and machines before a workload
//! is built. Detects:
//! - Duplicate task IDs and machine indices
//! - Machine indices that do not form a contiguous `0..M` range
//! - Zero-length tasks
//! - Non-positive or non-finite machine speeds
//!
//! Emptiness is not reported here; [`Workload::new`](crate::models::Workload::new)
//! rejects it separately as [`SchedulingError::EmptyWorkload`](crate::SchedulingError::EmptyWorkload).

use std::collections::HashSet;

use crate::models::{Machine, Task};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// Machine indices leave a gap in `0..M`.
    NonContiguousIndex,
    /// A task has zero length.
    ZeroLength,
    /// A machine speed is zero, negative, or not finite.
    InvalidSpeed,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the tasks and machines of one scheduling run.
///
/// Checks:
/// 1. No duplicate task IDs
/// 2. All task lengths are positive
/// 3. No duplicate machine indices
/// 4. Machine indices cover exactly `0..machines.len()`
/// 5. All machine speeds are finite and positive
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(tasks: &[Task], machines: &[Machine]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut task_ids = HashSet::new();
    for task in tasks {
        if !task_ids.insert(task.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }
        if task.length == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroLength,
                format!("Task {} has zero length", task.id),
            ));
        }
    }

    let mut machine_indices = HashSet::new();
    for machine in machines {
        if !machine_indices.insert(machine.index) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate machine index: {}", machine.index),
            ));
        }
        if !machine.speed.is_finite() || machine.speed <= 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSpeed,
                format!("Machine {} has invalid speed {}", machine.index, machine.speed),
            ));
        }
    }

    // Duplicates already reported; a gap only matters when indices are unique
    if machine_indices.len() == machines.len() {
        if let Some(missing) = (0..machines.len()).find(|i| !machine_indices.contains(i)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonContiguousIndex,
                format!(
                    "Machine indices must cover 0..{}; index {} is missing",
                    machines.len(),
                    missing
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
