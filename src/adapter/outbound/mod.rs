//! Outbound adapters (driven side).

pub mod memory;
pub mod notifier;
pub mod provider;
pub mod sqlite;
