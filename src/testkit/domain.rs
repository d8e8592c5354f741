//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`Watch`], [`Leg`], [`Manifest`]
//! and [`PriceQuote`] so tests focus on assertions rather than construction
//! boilerplate.

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;

use crate::domain::{
    BookableRef, Itinerary, Leg, Manifest, Passenger, PassengerCategory, PriceQuote, Provider,
    ReservationCode, Watch,
};

/// Interval used by builder watches; equals the provider minimum.
pub const TEST_INTERVAL_SECS: u64 = 300;

/// A fixed travel date well in the future.
pub fn travel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 15).unwrap_or_default()
}

/// Create a [`Leg`] on [`travel_date`].
pub fn leg(origin: &str, destination: &str) -> Leg {
    Leg::new(origin, destination, travel_date())
}

/// Parse `HH:MM` for time-filtered legs.
pub fn time(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, "%H:%M").unwrap_or_default()
}

/// One adult with placeholder details.
pub fn adult_manifest() -> Manifest {
    Manifest::new(vec![Passenger::new(
        PassengerCategory::Adult,
        json!({"first_name": "Ada", "last_name": "Lovelace"}),
    )])
}

/// Active alpha one-way watch GRU→JFK, auto-hold off, never checked.
pub fn one_way_watch() -> Watch {
    Watch::new(
        "owner-1",
        Itinerary::one_way(Provider::Alpha, leg("GRU", "JFK")),
        TEST_INTERVAL_SECS,
    )
    .with_manifest(adult_manifest())
}

/// Active alpha round-trip watch GRU→JFK→GRU.
pub fn round_trip_watch() -> Watch {
    let inbound = Leg::new(
        "JFK",
        "GRU",
        travel_date().succ_opt().unwrap_or_else(travel_date),
    );
    Watch::new(
        "owner-1",
        Itinerary::round_trip(Provider::Alpha, leg("GRU", "JFK"), inbound),
        TEST_INTERVAL_SECS,
    )
    .with_manifest(adult_manifest())
}

/// Alpha one-way watch with a stored price and auto-hold on.
pub fn hold_ready_watch(id: &str, price: i64) -> Watch {
    one_way_watch()
        .with_id(id)
        .with_price(price)
        .with_auto_hold(true)
}

/// Beta one-way watch.
pub fn beta_watch(id: &str) -> Watch {
    Watch::new(
        "owner-2",
        Itinerary::one_way(Provider::Beta, leg("GIG", "LIS")),
        TEST_INTERVAL_SECS,
    )
    .with_id(id)
    .with_manifest(adult_manifest())
}

/// Watch imported from an existing reservation.
pub fn imported_watch(id: &str, price: i64, prior: &str) -> Watch {
    hold_ready_watch(id, price).from_reservation(ReservationCode::new(prior))
}

/// Matched quote with one reference per entry in `refs`.
pub fn quote(price: i64, refs: &[&str]) -> PriceQuote {
    PriceQuote::matched(
        price,
        refs.iter().map(|r| Some(BookableRef::new(*r))).collect(),
    )
}

/// Matched single-leg quote with reference `fk-{price}`.
pub fn one_leg_quote(price: i64) -> PriceQuote {
    PriceQuote::matched(price, vec![Some(BookableRef::new(format!("fk-{price}")))])
}
