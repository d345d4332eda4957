//! Population of candidate assignments.
//!
//! Member order carries no meaning beyond reproducible partner
//! selection in pairwise operators.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Assignment, Workload};

/// Fixed-size ordered collection of assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    members: Vec<Assignment>,
}

impl Population {
    /// Wraps existing members.
    pub fn new(members: Vec<Assignment>) -> Self {
        Self { members }
    }

    /// Generates `size` random capped assignments.
    pub fn random<R: Rng>(workload: &Workload, size: usize, capacity: usize, rng: &mut R) -> Self {
        let members = (0..size)
            .map(|_| Assignment::random(workload, capacity, rng))
            .collect();
        Self { members }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the population has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in slot order.
    pub fn members(&self) -> &[Assignment] {
        &self.members
    }

    /// Member at `slot`.
    pub fn get(&self, slot: usize) -> Option<&Assignment> {
        self.members.get(slot)
    }

    /// Iterates members in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.members.iter()
    }

    /// Consumes the population, returning its members.
    pub fn into_members(self) -> Vec<Assignment> {
        self.members
    }
}

impl FromIterator<Assignment> for Population {
    fn from_iter<I: IntoIterator<Item = Assignment>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_random_population() {
        let workload = Workload::from_lengths(&[3, 4, 5, 6], &[1.0, 1.0, 1.0]).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let pop = Population::random(&workload, 20, workload.capacity(1), &mut rng);
        assert_eq!(pop.len(), 20);
        assert!(pop.iter().all(|a| a.is_valid(&workload)));
    }

    #[test]
    fn test_same_seed_same_population() {
        let workload = Workload::from_lengths(&[3, 4, 5, 6, 7], &[1.0, 2.0]).unwrap();
        let a = Population::random(&workload, 5, 4, &mut SmallRng::seed_from_u64(9));
        let b = Population::random(&workload, 5, 4, &mut SmallRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_collect() {
        let pop: Population = (0..3).map(|_| Assignment::empty(2)).collect();
        assert_eq!(pop.len(), 3);
        assert!(!pop.is_empty());
        assert_eq!(pop.get(2).map(Assignment::machine_count), Some(2));
        assert!(pop.get(3).is_none());
    }
}
