//! Watch scheduler: timer registry plus the coordinating loop.

pub mod registry;
mod runtime;

pub use registry::TimerRegistry;
pub use runtime::{Scheduler, SchedulerHandle, SchedulerSettings};
