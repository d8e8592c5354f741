//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod clock;
pub mod fetch;
pub mod notifier;
pub mod reservation;
pub mod store;
