//! Inbound ports (driving side): interfaces the engine exposes to operators.

pub mod operator;
pub mod scheduler;
