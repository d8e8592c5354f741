//! Application services (use cases).
//!
//! The watch engine: the in-flight guard, the check cycle, auto-hold and
//! the scheduler that drives them.

pub mod cycle;
pub mod hold;
pub mod scheduler;
pub mod state;

pub use cycle::{CheckCycle, CycleOutcome, CycleReport, CycleSettings};
pub use hold::{AutoHoldOrchestrator, HoldOutcome};
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerSettings};
pub use state::{CycleGuard, CycleLease};
