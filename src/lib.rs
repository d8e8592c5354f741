//! Farewatch - airfare watch scheduler with auto-hold.
//!
//! Re-prices watched itineraries on a per-watch interval, compares each
//! quote with the last stored price, notifies the owner, and places a hold
//! automatically when a qualifying drop appears.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Watches, itineraries, quotes, the price policy and the
//!   due-selection rule. No I/O.
//! - [`port`] - Traits at the engine boundary: price fetch, reservations,
//!   storage, notifications, clock, and the scheduler control surface.
//! - [`application`] - The engine: in-flight guard, check cycle, auto-hold
//!   orchestration and the scheduler loop.
//! - [`adapter`] - Provider HTTP clients, SQLite and in-memory stores,
//!   notifiers, and the CLI.
//! - [`infrastructure`] - Configuration, logging, wiring and the runtime
//!   lifecycle.
//!
//! # Features
//!
//! - `telegram` - Telegram notifications (default)
//! - `testkit` - Scripted fakes and builders for integration tests
//!
//! # Example
//!
//! ```no_run
//! use farewatch::domain::{Itinerary, Leg, Provider, Watch};
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2030, 6, 15).unwrap();
//! let watch = Watch::new(
//!     "owner",
//!     Itinerary::one_way(Provider::Alpha, Leg::new("GRU", "JFK", date)),
//!     600,
//! );
//! assert!(watch.validate().is_ok());
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
