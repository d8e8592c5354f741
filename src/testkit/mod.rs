//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] — Builders for watches, legs, manifests and quotes.
//! - [`provider`] — `ScriptedFetcher` and `ScriptedReservations` fakes for
//!   the provider ports.
//! - [`notifier`] — `RecordingNotifier` that keeps every emitted event.
//! - [`store`] — `FlakyStore` wrapper that fails reservation writes on demand.
//! - [`engine`] — `Harness` wiring the check cycle and scheduler over the
//!   fakes and the in-memory store.

pub mod domain;
pub mod engine;
pub mod notifier;
pub mod provider;
pub mod store;
