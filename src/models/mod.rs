//! Load-balancing domain models.
//!
//! Provides the data types for one scheduling run: the immutable
//! workload (tasks and machines) and the candidate solutions searched
//! over (assignments and populations).
//!
//! # Domain Mappings
//!
//! | u-makespan | Cloud | Manufacturing | Batch Compute |
//! |------------|-------|---------------|---------------|
//! | Task | Cloudlet | Job | Work item |
//! | Machine | VM | Workstation | Worker node |
//! | Assignment | Placement plan | Dispatch list | Shard map |

mod assignment;
mod machine;
mod population;
mod task;
mod workload;

pub use assignment::Assignment;
pub use machine::Machine;
pub use population::Population;
pub use task::{Task, TaskId};
pub use workload::Workload;
