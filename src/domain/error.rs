//! Domain validation errors.
//!
//! Returned when a watch is created or updated with values that violate
//! its invariants. The scheduling engine never produces these; they guard
//! the creation/import path.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The check interval is shorter than the provider allows.
    #[error("check interval {interval}s is below the provider minimum of {minimum}s")]
    IntervalBelowMinimum {
        /// The requested interval in seconds.
        interval: u64,
        /// The provider minimum in seconds.
        minimum: u64,
    },

    /// An itinerary needs at least one leg.
    #[error("itinerary has no legs")]
    NoLegs,

    /// One-way itineraries have one leg, round trips exactly two.
    #[error("round_trip={round_trip} does not fit {legs} leg(s)")]
    LegCountMismatch {
        /// Whether the itinerary is flagged as a round trip.
        round_trip: bool,
        /// Number of legs supplied.
        legs: usize,
    },

    /// Airport codes must be non-empty and differ per leg.
    #[error("leg {leg} has an invalid route: {reason}")]
    InvalidRoute {
        /// Zero-based leg index.
        leg: usize,
        /// What is wrong with the route.
        reason: &'static str,
    },
}
