//! Population-based makespan minimization on uniform parallel machines.
//!
//! Assigns independent tasks of known length to machines of known speed so
//! that the latest machine completion time (the makespan) is as small as
//! possible. Two metaheuristics search over the same bucket encoding:
//! flower pollination and a genetic algorithm with truncation elitism.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Machine`, `Workload`,
//!   `Assignment`, `Population`
//! - **`validation`**: Input integrity checks (duplicate IDs, machine indices, speeds)
//! - **`fitness`**: Makespan evaluation, optionally batched on rayon
//! - **`repair`**: Restores the exactly-once invariant after recombination
//! - **`ga`**: Variation operators and the pollination and genetic strategies
//! - **`checkpoint`**: Plain-text population save/load
//! - **`scheduler`**: Optimizer loop, configuration, results, and KPIs
//!
//! # Example
//!
//! ```
//! use u_makespan::models::Workload;
//! use u_makespan::scheduler::{Optimizer, OptimizerConfig, PopulationInit};
//!
//! let workload = Workload::from_lengths(&[5, 5, 5], &[1.0]).unwrap();
//! let config = OptimizerConfig::genetic().with_seed(7).with_generations(5);
//! let result = Optimizer::new(&workload, config)
//!     .unwrap()
//!     .run(PopulationInit::Random)
//!     .unwrap();
//! assert_eq!(result.makespan, 15.0);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Yang (2012), "Flower Pollination Algorithm for Global Optimization"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"

pub mod checkpoint;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod models;
pub mod repair;
pub mod scheduler;
pub mod validation;

pub use error::{RepairExhausted, Result, SchedulingError};
