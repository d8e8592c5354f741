//! Operator implementations for inbound adapters.

pub mod entry;
pub mod runtime;
pub mod watch;

mod shared;
