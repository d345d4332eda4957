//! Bucket-per-machine assignment encoding.
//!
//! # Encoding
//!
//! An assignment holds one bucket per machine, in machine-index order.
//! Each bucket is an unordered list of task IDs. A feasible assignment
//! places every task of the workload in exactly one bucket.
//!
//! Recombination copies whole buckets from two parents, so a child may
//! temporarily hold a task twice or not at all; see [`crate::repair`].

use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{TaskId, Workload};

/// Task-to-machine assignment (a.k.a. solution or chromosome).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// One bucket per machine; `buckets[i]` holds the tasks of machine `i`.
    pub buckets: Vec<Vec<TaskId>>,
}

impl Assignment {
    /// Creates an assignment with `machine_count` empty buckets.
    pub fn empty(machine_count: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); machine_count],
        }
    }

    /// Wraps existing buckets.
    pub fn from_buckets(buckets: Vec<Vec<TaskId>>) -> Self {
        Self { buckets }
    }

    /// Creates a random feasible assignment.
    ///
    /// Each task, in workload order, goes to a uniformly drawn machine
    /// whose bucket is still below `capacity`; full machines are redrawn.
    /// If `capacity * machines < tasks` the cap is ignored for the
    /// remainder so that every task is still placed.
    pub fn random<R: Rng>(workload: &Workload, capacity: usize, rng: &mut R) -> Self {
        let machines = workload.machine_count();
        let mut assignment = Self::empty(machines);
        let mut counts = vec![0usize; machines];

        for id in workload.task_ids() {
            let has_room = counts.iter().any(|&c| c < capacity);
            let machine = loop {
                let m = rng.random_range(0..machines);
                if !has_room || counts[m] < capacity {
                    break m;
                }
            };
            assignment.buckets[machine].push(id);
            counts[machine] += 1;
        }
        assignment
    }

    /// Number of buckets.
    pub fn machine_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total task entries across buckets (duplicates counted).
    pub fn entry_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Machines on which each task currently appears, in bucket order.
    ///
    /// A task listed twice in one bucket yields that machine twice.
    pub fn locations(&self) -> HashMap<TaskId, Vec<usize>> {
        let mut locations: HashMap<TaskId, Vec<usize>> = HashMap::new();
        for (machine, bucket) in self.buckets.iter().enumerate() {
            for &id in bucket {
                locations.entry(id).or_default().push(machine);
            }
        }
        locations
    }

    /// Machine hosting a task (first occurrence), if any.
    pub fn machine_of(&self, id: TaskId) -> Option<usize> {
        self.buckets.iter().position(|b| b.contains(&id))
    }

    /// Converts to a `task_id → machine_index` map.
    ///
    /// For a feasible assignment every task appears exactly once, so the
    /// map has one entry per task.
    pub fn to_task_map(&self) -> BTreeMap<TaskId, usize> {
        let mut map = BTreeMap::new();
        for (machine, bucket) in self.buckets.iter().enumerate() {
            for &id in bucket {
                map.entry(id).or_insert(machine);
            }
        }
        map
    }

    /// Whether every workload task appears exactly once and nothing else does.
    pub fn is_valid(&self, workload: &Workload) -> bool {
        if self.buckets.len() != workload.machine_count() {
            return false;
        }
        if self.entry_count() != workload.task_count() {
            return false;
        }
        let mut seen = vec![false; workload.task_count()];
        for &id in self.buckets.iter().flatten() {
            match workload.position_of(id) {
                Some(pos) if !seen[pos] => seen[pos] = true,
                _ => return false,
            }
        }
        true
    }
}
