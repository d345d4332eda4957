//! Optimizer loop and result metrics.
//!
//! [`Optimizer`] drives a population through a fixed generation budget
//! using a [`VariationStrategy`](crate::ga::VariationStrategy), and reports
//! the best assignment found as an [`OptimizationResult`].
//!
//! # KPI
//!
//! [`LoadKpi`] computes load-balance metrics for any assignment: makespan,
//! per-machine utilization, imbalance, and the fractional lower bound.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 5 (Q||C_max)
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"

mod cancel;
mod config;
mod engine;
mod kpi;
mod result;

pub use cancel::CancellationToken;
pub use config::OptimizerConfig;
pub use engine::{Optimizer, PopulationInit};
pub use kpi::LoadKpi;
pub use result::{OptimizationResult, TerminationReason};
