//! SQLite persistence adapter.
//!
//! Watches, price history and reservations stored with Diesel ORM.

pub mod database;
pub mod store;

pub use store::SqliteWatchStore;
