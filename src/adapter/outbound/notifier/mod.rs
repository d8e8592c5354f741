//! Notification adapters.
//!
//! Implements the `port::outbound::notifier::Notifier` trait for the
//! available delivery backends.

pub mod log;

#[cfg(feature = "telegram")]
pub mod telegram;
