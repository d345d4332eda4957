//! Workload model.
//!
//! Immutable description of the tasks and machines of one scheduling
//! run. Built once, validated on construction, and shared read-only by
//! the evaluator, repair, and variation operators (it is `Sync`, so
//! parallel evaluation can borrow it freely).

use std::collections::HashMap;

use super::{Machine, Task, TaskId};
use crate::error::{Result, SchedulingError};
use crate::validation::validate_input;

/// Validated tasks and machines for one run.
///
/// # Example
/// ```
/// use u_makespan::models::Workload;
///
/// let workload = Workload::from_lengths(&[10, 10, 10, 10], &[1.0, 1.0]).unwrap();
/// assert_eq!(workload.task_count(), 4);
/// assert_eq!(workload.machine_count(), 2);
/// assert_eq!(workload.capacity(1), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Workload {
    tasks: Vec<Task>,
    speeds: Vec<f64>,
    index: HashMap<TaskId, usize>,
}

impl Workload {
    /// Builds a workload from task and machine descriptions.
    ///
    /// Machines may be supplied in any order; they are stored by index.
    ///
    /// # Errors
    /// - [`SchedulingError::EmptyWorkload`] if either list is empty.
    /// - [`SchedulingError::InvalidInput`] if validation fails.
    pub fn new(tasks: Vec<Task>, mut machines: Vec<Machine>) -> Result<Self> {
        if tasks.is_empty() || machines.is_empty() {
            return Err(SchedulingError::EmptyWorkload {
                tasks: tasks.len(),
                machines: machines.len(),
            });
        }
        validate_input(&tasks, &machines).map_err(SchedulingError::InvalidInput)?;

        machines.sort_by_key(|m| m.index);
        let speeds = machines.iter().map(|m| m.speed).collect();
        let index = tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

        Ok(Self {
            tasks,
            speeds,
            index,
        })
    }

    /// Builds a workload with task IDs `0..lengths.len()` and machine
    /// indices `0..speeds.len()`.
    pub fn from_lengths(lengths: &[u64], speeds: &[f64]) -> Result<Self> {
        let tasks = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| Task::new(i as TaskId, len))
            .collect();
        Self::new(tasks, Machine::from_speeds(speeds))
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of machines (= buckets per assignment).
    pub fn machine_count(&self) -> usize {
        self.speeds.len()
    }

    /// Tasks in input order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Task IDs in input order.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().map(|t| t.id)
    }

    /// Machine speeds, indexed by machine index.
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    /// Length of a task, or `None` if the ID is unknown.
    pub fn length_of(&self, id: TaskId) -> Option<u64> {
        self.index.get(&id).map(|&i| self.tasks[i].length)
    }

    /// Speed of a machine, or `None` if the index is out of range.
    pub fn speed_of(&self, machine: usize) -> Option<f64> {
        self.speeds.get(machine).copied()
    }

    /// Whether the task ID belongs to this workload.
    pub fn contains(&self, id: TaskId) -> bool {
        self.index.contains_key(&id)
    }

    /// Position of a task in input order.
    pub(crate) fn position_of(&self, id: TaskId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Per-machine task cap: `ceil(tasks / machines) + slack`.
    pub fn capacity(&self, slack: usize) -> usize {
        self.task_count().div_ceil(self.machine_count()) + slack
    }

    /// Sum of all task lengths.
    pub fn total_length(&self) -> u64 {
        self.tasks.iter().map(|t| t.length).sum()
    }
}
