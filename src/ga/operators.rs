//! Recombination and mutation operators on bucket assignments.
//!
//! Both search strategies build children with the same segment copy:
//! a cut index `c` is drawn in `[0, machines)`, buckets `0..=c` come from
//! the first parent and buckets `c+1..` from the second. Children are
//! generally infeasible until repaired.
//!
//! Mutation swaps one task between two distinct machines and never
//! breaks feasibility.

use rand::Rng;

use crate::models::Assignment;

/// Copies buckets `0..=cut` from `first` and the rest from `second`.
///
/// The child has as many buckets as `first`; buckets missing from
/// `second` come out empty.
pub fn segment_crossover(first: &Assignment, second: &Assignment, cut: usize) -> Assignment {
    let buckets = (0..first.machine_count())
        .map(|i| {
            if i <= cut {
                first.buckets[i].clone()
            } else {
                second.buckets.get(i).cloned().unwrap_or_default()
            }
        })
        .collect();
    Assignment::from_buckets(buckets)
}

/// Draws a cut index in `[0, machine_count)`.
pub fn random_cut<R: Rng>(machine_count: usize, rng: &mut R) -> usize {
    if machine_count == 0 {
        return 0;
    }
    rng.random_range(0..machine_count)
}

/// Segment crossover at a random cut.
pub fn pollinate<R: Rng>(flower: &Assignment, pollen: &Assignment, rng: &mut R) -> Assignment {
    let cut = random_cut(flower.machine_count(), rng);
    segment_crossover(flower, pollen, cut)
}

/// Swap mutation: exchanges one random task between two distinct machines.
///
/// Returns `false` (leaving the assignment untouched) when there are
/// fewer than two machines or either chosen bucket is empty.
pub fn swap_mutation<R: Rng>(assignment: &mut Assignment, rng: &mut R) -> bool {
    let machines = assignment.machine_count();
    if machines < 2 {
        return false;
    }
    let a = rng.random_range(0..machines);
    let mut b = rng.random_range(0..machines - 1);
    if b >= a {
        b += 1;
    }

    let len_a = assignment.buckets[a].len();
    let len_b = assignment.buckets[b].len();
    if len_a == 0 || len_b == 0 {
        return false;
    }
    let i = rng.random_range(0..len_a);
    let j = rng.random_range(0..len_b);

    let task = assignment.buckets[a][i];
    assignment.buckets[a][i] = assignment.buckets[b][j];
    assignment.buckets[b][j] = task;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn parents() -> (Assignment, Assignment) {
        let p1 = Assignment::from_buckets(vec![vec![0, 1], vec![2], vec![3, 4]]);
        let p2 = Assignment::from_buckets(vec![vec![4], vec![0, 3], vec![1, 2]]);
        (p1, p2)
    }

    #[test]
    fn test_segment_crossover_cut_inclusive() {
        let (p1, p2) = parents();
        let child = segment_crossover(&p1, &p2, 0);
        assert_eq!(child.buckets, vec![vec![0, 1], vec![0, 3], vec![1, 2]]);

        let child = segment_crossover(&p1, &p2, 1);
        assert_eq!(child.buckets, vec![vec![0, 1], vec![2], vec![1, 2]]);
    }

    #[test]
    fn test_segment_crossover_last_cut_copies_first() {
        let (p1, p2) = parents();
        assert_eq!(segment_crossover(&p1, &p2, 2), p1);
    }

    #[test]
    fn test_random_cut_in_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            assert!(random_cut(4, &mut rng) < 4);
        }
        assert_eq!(random_cut(1, &mut rng), 0);
    }

    #[test]
    fn test_pollinate_keeps_bucket_count() {
        let (p1, p2) = parents();
        let mut rng = SmallRng::seed_from_u64(3);
        let child = pollinate(&p1, &p2, &mut rng);
        assert_eq!(child.machine_count(), 3);
        assert_eq!(child.buckets[0], p1.buckets[0]);
    }

    #[test]
    fn test_swap_mutation_preserves_multiset_and_sizes() {
        let (p1, _) = parents();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut changed = false;
        for _ in 0..50 {
            let mut child = p1.clone();
            changed |= swap_mutation(&mut child, &mut rng);

            let sizes: Vec<usize> = child.buckets.iter().map(Vec::len).collect();
            assert_eq!(sizes, vec![2, 1, 2]);
            let mut all: Vec<u32> = child.buckets.iter().flatten().copied().collect();
            all.sort();
            assert_eq!(all, vec![0, 1, 2, 3, 4]);
        }
        assert!(changed);
    }

    #[test]
    fn test_swap_mutation_moves_tasks_across_machines() {
        let mut a = Assignment::from_buckets(vec![vec![0], vec![1]]);
        let mut rng = SmallRng::seed_from_u64(5);
        assert!(swap_mutation(&mut a, &mut rng));
        assert_eq!(a.buckets, vec![vec![1], vec![0]]);
    }

    #[test]
    fn test_swap_mutation_noop_cases() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut single = Assignment::from_buckets(vec![vec![0, 1, 2]]);
        assert!(!swap_mutation(&mut single, &mut rng));

        let mut one_empty = Assignment::from_buckets(vec![vec![0, 1], vec![]]);
        assert!(!swap_mutation(&mut one_empty, &mut rng));
        assert_eq!(one_empty.buckets, vec![vec![0, 1], vec![]]);
    }
}
