//! Infrastructure configuration modules.

pub mod logging;
pub mod scheduler;
pub mod settings;
pub mod telegram;
