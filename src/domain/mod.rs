//! Watch domain: itineraries, quotes, price policy, and reservations.
//!
//! Pure types and decision logic; no runtime, HTTP or storage concerns.

pub mod error;
pub mod id;
pub mod itinerary;
pub mod matching;
pub mod passenger;
pub mod policy;
pub mod quote;
pub mod reservation;
pub mod sample;
pub mod schedule;
pub mod watch;

pub use error::DomainError;
pub use id::{BookableRef, OwnerId, ReservationCode, WatchId};
pub use itinerary::{Itinerary, Leg, Provider};
pub use passenger::{Manifest, Passenger, PassengerCategory, PassengerCounts};
pub use policy::{Classification, PersistencePolicy, PriceDecision};
pub use quote::{FareOption, PriceQuote, QuotedLeg};
pub use reservation::{
    ReservationAttempt, ReservationConfirmation, ReservationRecord, ReservationRequest,
    ReservationStatus,
};
pub use sample::PriceSample;
pub use schedule::Trigger;
pub use watch::{Watch, WatchPatch};
