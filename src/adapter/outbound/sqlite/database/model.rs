//! Database model types for Diesel ORM.
//!
//! Timestamps are RFC 3339 text; structured fields are JSON text.

use diesel::prelude::*;

use super::schema::{price_samples, reservations, watches};

/// Database row for a watch.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = watches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WatchRow {
    pub id: String,
    pub owner: String,
    pub provider: String,
    pub itinerary: String,
    pub check_interval_secs: i64,
    pub active: bool,
    pub auto_hold: bool,
    pub last_checked_at: Option<String>,
    pub current_price: Option<i64>,
    pub bookable_refs: String,
    pub prior_reservation: Option<String>,
    pub manifest: String,
    pub created_at: String,
}

/// Partial update of a watch row. `None` fields are left untouched.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = watches)]
pub struct WatchChangeset {
    pub last_checked_at: Option<String>,
    pub current_price: Option<i64>,
    pub bookable_refs: Option<String>,
    pub active: Option<bool>,
}

/// Database row for a price sample (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = price_samples)]
pub struct NewPriceSampleRow {
    pub watch_id: String,
    pub observed_at: String,
    pub price: i64,
    pub persisted: bool,
}

/// Database row for a price sample (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = price_samples)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceSampleRow {
    pub id: Option<i32>,
    pub watch_id: String,
    pub observed_at: String,
    pub price: i64,
    pub persisted: bool,
}

/// Database row for a reservation.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReservationRow {
    pub code: String,
    pub watch_id: String,
    pub owner: String,
    pub provider: String,
    pub itinerary: String,
    pub manifest: String,
    pub bookable_refs: String,
    pub price: i64,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub superseded_by: Option<String>,
}
