//! Feasibility repair for recombined assignments.
//!
//! Segment recombination copies whole buckets from two parents, so a
//! child can hold a task in two buckets (once per parent) or in none.
//! Repair restores the exactly-once invariant in two ordered passes.
//!
//! # Algorithm
//!
//! 1. **Deduplication**: IDs unknown to the workload are dropped and
//!    repeats inside one bucket collapse to one. A task found in several
//!    buckets stays only in the bucket with the smallest current
//!    completion time; ties keep the lowest machine index.
//! 2. **Omission**: each missing task (workload order) goes to the
//!    least-loaded machine whose bucket is below capacity. When every
//!    machine is full the [`ExhaustionPolicy`] decides: overflow onto the
//!    least-loaded machine, or fail.
//!
//! Bucket loads are tracked as exact integer length sums and converted
//! to completion times at each comparison, so each decision sees the
//! effect of every earlier removal or insertion without rounding drift.
//!
//! Repairing a feasible assignment changes nothing.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RepairExhausted, Result, SchedulingError};
use crate::fitness::FitnessEvaluator;
use crate::models::{Assignment, TaskId, Workload};

/// What to do when no machine has room for an omitted task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExhaustionPolicy {
    /// Log a warning and place the task on the least-loaded machine,
    /// exceeding capacity.
    #[default]
    PlaceOnLeastLoaded,
    /// Return [`SchedulingError::RepairExhausted`].
    Fail,
}

/// Summary of the changes made by one repair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairReport {
    /// Duplicate placements removed (across and within buckets).
    pub removed_duplicates: usize,
    /// Unknown task IDs dropped.
    pub dropped_unknown: usize,
    /// Omitted tasks inserted.
    pub inserted: usize,
    /// Tasks placed over capacity.
    pub exhausted: Vec<RepairExhausted>,
}

impl RepairReport {
    /// Whether the assignment was already feasible.
    pub fn is_noop(&self) -> bool {
        self.removed_duplicates == 0 && self.dropped_unknown == 0 && self.inserted == 0
    }
}

/// Repairs assignments for one workload and capacity bound.
#[derive(Debug, Clone, Copy)]
pub struct Repairer<'a> {
    evaluator: FitnessEvaluator<'a>,
    capacity: usize,
    policy: ExhaustionPolicy,
}

impl<'a> Repairer<'a> {
    /// Creates a repairer with the given per-machine task cap.
    pub fn new(workload: &'a Workload, capacity: usize, policy: ExhaustionPolicy) -> Self {
        Self {
            evaluator: FitnessEvaluator::new(workload),
            capacity,
            policy,
        }
    }

    /// Per-machine task cap.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Restores the exactly-once invariant in place.
    ///
    /// # Errors
    /// - [`SchedulingError::InvalidAssignment`] if the bucket count does
    ///   not match the machine count.
    /// - [`SchedulingError::RepairExhausted`] under [`ExhaustionPolicy::Fail`].
    pub fn repair(&self, assignment: &mut Assignment) -> Result<RepairReport> {
        let workload = self.evaluator.workload();
        if assignment.machine_count() != workload.machine_count() {
            return Err(SchedulingError::InvalidAssignment(format!(
                "expected {} buckets, found {}",
                workload.machine_count(),
                assignment.machine_count()
            )));
        }

        let mut report = RepairReport::default();
        self.deduplicate(assignment, &mut report);
        self.fill_omissions(assignment, &mut report)?;
        Ok(report)
    }

    fn deduplicate(&self, assignment: &mut Assignment, report: &mut RepairReport) {
        let workload = self.evaluator.workload();

        for bucket in &mut assignment.buckets {
            let before = bucket.len();
            bucket.retain(|&id| workload.contains(id));
            report.dropped_unknown += before - bucket.len();

            let mut seen = HashSet::with_capacity(bucket.len());
            let before = bucket.len();
            bucket.retain(|&id| seen.insert(id));
            report.removed_duplicates += before - bucket.len();
        }

        let locations = assignment.locations();
        let mut loads = self.evaluator.bucket_loads(assignment);
        let time = |loads: &[u64], m: usize| self.evaluator.load_time(m, loads[m]);

        for task in workload.tasks() {
            let Some(machines) = locations.get(&task.id) else {
                continue;
            };
            if machines.len() < 2 {
                continue;
            }

            // Lightest bucket wins; strict comparison keeps the lower index on ties
            let mut keep = machines[0];
            for &m in &machines[1..] {
                if time(&loads, m) < time(&loads, keep) {
                    keep = m;
                }
            }

            for &m in machines.iter().filter(|&&m| m != keep) {
                let bucket = &mut assignment.buckets[m];
                if let Some(pos) = bucket.iter().position(|&id| id == task.id) {
                    bucket.remove(pos);
                    loads[m] -= task.length;
                    report.removed_duplicates += 1;
                }
            }
        }
    }

    fn fill_omissions(&self, assignment: &mut Assignment, report: &mut RepairReport) -> Result<()> {
        let workload = self.evaluator.workload();
        let present: HashSet<TaskId> = assignment.buckets.iter().flatten().copied().collect();
        if present.len() == workload.task_count() {
            return Ok(());
        }

        let mut loads = self.evaluator.bucket_loads(assignment);

        for task in workload.tasks() {
            if present.contains(&task.id) {
                continue;
            }

            let times: Vec<f64> = (0..loads.len())
                .map(|m| self.evaluator.load_time(m, loads[m]))
                .collect();
            let mut order: Vec<usize> = (0..times.len()).collect();
            order.sort_by(|&a, &b| match times[a].total_cmp(&times[b]) {
                Ordering::Equal => a.cmp(&b),
                other => other,
            });

            let target = match order
                .iter()
                .copied()
                .find(|&m| assignment.buckets[m].len() < self.capacity)
            {
                Some(m) => m,
                None => {
                    let exhausted = RepairExhausted {
                        task_id: task.id,
                        capacity: self.capacity,
                        least_loaded: order[0],
                    };
                    if self.policy == ExhaustionPolicy::Fail {
                        return Err(exhausted.into());
                    }
                    warn!(
                        task_id = task.id,
                        capacity = self.capacity,
                        machine = order[0],
                        "repair exhausted capacity; placing task over the cap"
                    );
                    report.exhausted.push(exhausted);
                    order[0]
                }
            };

            assignment.buckets[target].push(task.id);
            loads[target] += task.length;
            report.inserted += 1;
        }
        Ok(())
    }

    /// Verifies the exactly-once invariant.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidAssignment`] describing the first violation.
    pub fn check(&self, assignment: &Assignment) -> Result<()> {
        check_assignment(self.evaluator.workload(), assignment)
    }
}

/// Verifies that every workload task appears in exactly one bucket.
///
/// # Errors
/// [`SchedulingError::InvalidAssignment`] describing the first violation.
pub fn check_assignment(workload: &Workload, assignment: &Assignment) -> Result<()> {
    if assignment.machine_count() != workload.machine_count() {
        return Err(SchedulingError::InvalidAssignment(format!(
            "expected {} buckets, found {}",
            workload.machine_count(),
            assignment.machine_count()
        )));
    }

    let mut seen = vec![false; workload.task_count()];
    for (machine, bucket) in assignment.buckets.iter().enumerate() {
        for &id in bucket {
            let Some(pos) = workload.position_of(id) else {
                return Err(SchedulingError::InvalidAssignment(format!(
                    "unknown task {id} on machine {machine}"
                )));
            };
            if seen[pos] {
                return Err(SchedulingError::InvalidAssignment(format!(
                    "task {id} assigned more than once"
                )));
            }
            seen[pos] = true;
        }
    }

    if let Some(pos) = seen.iter().position(|&s| !s) {
        return Err(SchedulingError::InvalidAssignment(format!(
            "task {} is unassigned",
            workload.tasks()[pos].id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::models::{Machine, Task};

    fn repairer(workload: &Workload) -> Repairer<'_> {
        Repairer::new(workload, workload.capacity(1), ExhaustionPolicy::default())
    }

    #[test]
    fn test_duplicate_removed_from_heavier_bucket() {
        // Task 0 (length 2) is on both machines. Bucket 0 totals 12.0, bucket 1 totals 7.0
        let tasks = vec![
            Task::new(0, 2),
            Task::new(1, 10),
            Task::new(2, 5),
        ];
        let workload = Workload::new(tasks, Machine::from_speeds(&[1.0, 1.0])).unwrap();
        let mut a = Assignment::from_buckets(vec![vec![0, 1], vec![0, 2]]);
        let eval = FitnessEvaluator::new(&workload);
        assert_eq!(eval.completion_times(&a), vec![12.0, 7.0]);

        let report = repairer(&workload).repair(&mut a).unwrap();
        assert_eq!(a.buckets, vec![vec![1], vec![0, 2]]);
        assert_eq!(report.removed_duplicates, 1);
        assert!(a.is_valid(&workload));
    }

    #[test]
    fn test_duplicate_tie_keeps_lower_index() {
        let workload = Workload::from_lengths(&[4, 3, 3], &[1.0, 1.0]).unwrap();
        let mut a = Assignment::from_buckets(vec![vec![0, 1], vec![0, 2]]);
        repairer(&workload).repair(&mut a).unwrap();
        assert_eq!(a.buckets, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_duplicate_tie_at_fractional_speeds() {
        // After task 0 leaves bucket 0, buckets 0 and 3 both hold 20 units at
        // speed 3.0 and must compare equal, so task 1 stays on machine 0.
        let workload = Workload::from_lengths(&[30, 20, 20], &[3.0, 3.0, 7.0, 3.0]).unwrap();
        let mut a = Assignment::from_buckets(vec![vec![0, 1], vec![2], vec![0], vec![1]]);
        let report = repairer(&workload).repair(&mut a).unwrap();
        assert_eq!(a.buckets, vec![vec![1], vec![2], vec![0], vec![]]);
        assert_eq!(report.removed_duplicates, 2);
    }

    #[test]
    fn test_omission_tie_at_fractional_speeds() {
        // Machine 0 grows 10 -> 20 -> 30 units while machine 1 holds 30; the
        // last task then sees a tie at 10.0 and goes to machine 0.
        let workload = Workload::from_lengths(&[10, 30, 10, 10, 10], &[3.0, 3.0]).unwrap();
        let mut a = Assignment::from_buckets(vec![vec![0], vec![1]]);
        repairer(&workload).repair(&mut a).unwrap();
        assert_eq!(a.buckets, vec![vec![0, 2, 3, 4], vec![1]]);
    }

    /// Repair that recomputes every completion time from scratch.
    fn repair_from_scratch(workload: &Workload, capacity: usize, child: &Assignment) -> Assignment {
        let eval = FitnessEvaluator::new(workload);
        let mut a = child.clone();
        for bucket in &mut a.buckets {
            let mut seen = HashSet::new();
            bucket.retain(|&id| workload.contains(id) && seen.insert(id));
        }

        for task in workload.tasks() {
            let machines: Vec<usize> = (0..a.machine_count())
                .filter(|&m| a.buckets[m].contains(&task.id))
                .collect();
            if machines.len() < 2 {
                continue;
            }
            let times = eval.completion_times(&a);
            let mut keep = machines[0];
            for &m in &machines[1..] {
                if times[m] < times[keep] {
                    keep = m;
                }
            }
            for &m in machines.iter().filter(|&&m| m != keep) {
                a.buckets[m].retain(|&id| id != task.id);
            }
        }

        for task in workload.tasks() {
            if a.machine_of(task.id).is_some() {
                continue;
            }
            let times = eval.completion_times(&a);
            let mut order: Vec<usize> = (0..a.machine_count()).collect();
            order.sort_by(|&x, &y| times[x].total_cmp(&times[y]).then(x.cmp(&y)));
            let target = order
                .iter()
                .copied()
                .find(|&m| a.buckets[m].len() < capacity)
                .unwrap_or(order[0]);
            a.buckets[target].push(task.id);
        }
        a
    }

    #[test]
    fn test_repair_matches_fresh_recompute_at_fractional_speeds() {
        let speeds_pool = [0.1, 0.3, 3.0, 7.0];
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..2000 {
            let tasks = rng.random_range(2..8);
            let machines = rng.random_range(2..5);
            let lengths: Vec<u64> = (0..tasks).map(|_| rng.random_range(1..4) * 10).collect();
            let speeds: Vec<f64> = (0..machines)
                .map(|_| speeds_pool[rng.random_range(0..speeds_pool.len())])
                .collect();
            let workload = Workload::from_lengths(&lengths, &speeds).unwrap();
            let capacity = workload.capacity(1);

            let p1 = Assignment::random(&workload, capacity, &mut rng);
            let p2 = Assignment::random(&workload, capacity, &mut rng);
            let cut = rng.random_range(0..machines);
            let child = crate::ga::segment_crossover(&p1, &p2, cut);

            let expected = repair_from_scratch(&workload, capacity, &child);
            let mut repaired = child.clone();
            repairer(&workload).repair(&mut repaired).unwrap();
            assert_eq!(repaired, expected, "child {:?}", child.buckets);
        }
    }

    #[test]
    fn test_omission_goes_to_least_loaded() {
        let workload = Workload::from_lengths(&[10, 1, 5], &[1.0, 1.0, 1.0]).unwrap();
        let mut a = Assignment::from_buckets(vec![vec![0], vec![1], vec![]]);
        let report = repairer(&workload).repair(&mut a).unwrap();
        assert_eq!(a.buckets, vec![vec![0], vec![1], vec![2]]);
        assert_eq!(report.inserted, 1);
    }

    #[test]
    fn test_omission_skips_full_machine() {
        // capacity = ceil(4 / 2) + 0 = 2; machine 1 is lighter but full
        let workload = Workload::from_lengths(&[50, 1, 1, 1], &[1.0, 1.0]).unwrap();
        let r = Repairer::new(&workload, workload.capacity(0), ExhaustionPolicy::default());
        let mut a = Assignment::from_buckets(vec![vec![0], vec![1, 2]]);
        r.repair(&mut a).unwrap();
        assert_eq!(a.buckets, vec![vec![0, 3], vec![1, 2]]);
    }

    #[test]
    fn test_exhausted_places_on_least_loaded() {
        let workload = Workload::from_lengths(&[9, 1, 1], &[1.0, 1.0]).unwrap();
        let r = Repairer::new(&workload, 1, ExhaustionPolicy::PlaceOnLeastLoaded);
        let mut a = Assignment::from_buckets(vec![vec![0], vec![1]]);
        let report = r.repair(&mut a).unwrap();

        assert_eq!(a.buckets, vec![vec![0], vec![1, 2]]);
        assert_eq!(
            report.exhausted,
            vec![RepairExhausted {
                task_id: 2,
                capacity: 1,
                least_loaded: 1
            }]
        );
        assert!(check_assignment(&workload, &a).is_ok());
    }

    #[test]
    fn test_exhausted_fail_policy() {
        let workload = Workload::from_lengths(&[9, 1, 1], &[1.0, 1.0]).unwrap();
        let r = Repairer::new(&workload, 1, ExhaustionPolicy::Fail);
        let mut a = Assignment::from_buckets(vec![vec![0], vec![1]]);
        let err = r.repair(&mut a).unwrap_err();
        assert!(matches!(err, SchedulingError::RepairExhausted(e) if e.task_id == 2));
    }

    #[test]
    fn test_unknown_and_repeated_ids() {
        let workload = Workload::from_lengths(&[1, 1], &[1.0, 1.0]).unwrap();
        let mut a = Assignment::from_buckets(vec![vec![0, 0, 7], vec![1]]);
        let report = repairer(&workload).repair(&mut a).unwrap();
        assert_eq!(a.buckets, vec![vec![0], vec![1]]);
        assert_eq!(report.dropped_unknown, 1);
        assert_eq!(report.removed_duplicates, 1);
    }

    #[test]
    fn test_wrong_bucket_count() {
        let workload = Workload::from_lengths(&[1, 1], &[1.0, 1.0]).unwrap();
        let mut a = Assignment::from_buckets(vec![vec![0, 1]]);
        let err = repairer(&workload).repair(&mut a).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidAssignment(_)));
    }

    #[test]
    fn test_valid_assignment_untouched() {
        let workload = Workload::from_lengths(&[3, 1, 4, 1, 5], &[1.0, 2.0]).unwrap();
        let mut a = Assignment::from_buckets(vec![vec![4, 0], vec![2, 1, 3]]);
        let before = a.clone();
        let report = repairer(&workload).repair(&mut a).unwrap();
        assert!(report.is_noop());
        assert_eq!(a, before);
    }

    #[test]
    fn test_repair_randomized_invariants() {
        let lengths: Vec<u64> = (1..=17).map(|i| (i * 7 % 13 + 1) as u64).collect();
        let workload = Workload::from_lengths(&lengths, &[1.0, 1.5, 2.0, 0.5]).unwrap();
        let r = repairer(&workload);
        let mut rng = SmallRng::seed_from_u64(42);
        let capacity = workload.capacity(1);

        for _ in 0..200 {
            let p1 = Assignment::random(&workload, capacity, &mut rng);
            let p2 = Assignment::random(&workload, capacity, &mut rng);
            let cut = rng.random_range(0..workload.machine_count());
            let mut child = crate::ga::segment_crossover(&p1, &p2, cut);

            r.repair(&mut child).unwrap();
            assert!(r.check(&child).is_ok());

            let once = child.clone();
            let report = r.repair(&mut child).unwrap();
            assert!(report.is_noop());
            assert_eq!(child, once);
        }
    }

    #[test]
    fn test_check_messages() {
        let workload = Workload::from_lengths(&[1, 1, 1], &[1.0, 1.0]).unwrap();
        let dup = Assignment::from_buckets(vec![vec![0, 1], vec![1, 2]]);
        let missing = Assignment::from_buckets(vec![vec![0], vec![1]]);
        let unknown = Assignment::from_buckets(vec![vec![0, 1, 2], vec![8]]);

        let msg = check_assignment(&workload, &dup).unwrap_err().to_string();
        assert!(msg.contains("task 1 assigned more than once"));
        let msg = check_assignment(&workload, &missing).unwrap_err().to_string();
        assert!(msg.contains("task 2 is unassigned"));
        let msg = check_assignment(&workload, &unknown).unwrap_err().to_string();
        assert!(msg.contains("unknown task 8"));
    }
}
