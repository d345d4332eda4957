//! Machine model.
//!
//! Machines host zero or more tasks. A machine's `index` is its slot in
//! every [`Assignment`](super::Assignment): bucket `i` holds the tasks of
//! the machine with index `i`.

use serde::{Deserialize, Serialize};

/// A machine that processes tasks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// 0-based slot index; defines bucket order.
    pub index: usize,
    /// Processing speed (work units per time unit, > 0).
    pub speed: f64,
}

impl Machine {
    /// Creates a machine.
    pub fn new(index: usize, speed: f64) -> Self {
        Self { index, speed }
    }

    /// Builds machines with indices `0..speeds.len()`.
    pub fn from_speeds(speeds: &[f64]) -> Vec<Self> {
        speeds
            .iter()
            .enumerate()
            .map(|(index, &speed)| Self::new(index, speed))
            .collect()
    }
}
