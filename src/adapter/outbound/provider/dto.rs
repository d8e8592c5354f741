//! Provider wire formats.
//!
//! Each provider's response shape is captured once in [`ProviderQuote`] and
//! normalized into a canonical [`PriceQuote`] before it leaves this module.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::itinerary::hhmm;
use crate::domain::matching::select_option;
use crate::domain::{
    BookableRef, FareOption, Leg, PassengerCounts, PriceQuote, QuotedLeg, ReservationCode,
    ReservationConfirmation, ReservationStatus,
};
use crate::error::{FetchError, ReservationError};

// ---------------------------------------------------------------------------
// Alpha
// ---------------------------------------------------------------------------

/// Availability request for a single leg.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaAvailabilityRequest {
    pub origin: String,
    pub destination: String,
    /// `YYYY-MM-DD`.
    pub departure_date: String,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl AlphaAvailabilityRequest {
    #[must_use]
    pub fn new(leg: &Leg, counts: PassengerCounts) -> Self {
        Self {
            origin: leg.origin.to_ascii_uppercase(),
            destination: leg.destination.to_ascii_uppercase(),
            departure_date: leg.date.format("%Y-%m-%d").to_string(),
            adults: counts.adults,
            children: counts.children,
            infants: counts.infants,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlphaAvailabilityResponse {
    #[serde(default)]
    pub flights: Vec<AlphaFlight>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaFlight {
    /// Local departure time, `HH:MM`.
    pub departure_time: String,
    #[serde(default)]
    pub fares: Vec<AlphaFare>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaFare {
    pub fare_class: String,
    /// Total for every passenger on this leg.
    #[serde(deserialize_with = "price::deserialize")]
    pub total_price: i64,
    #[serde(default)]
    pub fare_key: Option<String>,
}

impl AlphaAvailabilityResponse {
    /// One single-leg option per fare, in response order.
    #[must_use]
    pub fn options(&self) -> Vec<FareOption> {
        self.flights
            .iter()
            .flat_map(|flight| {
                let departs = hhmm::parse(&flight.departure_time);
                flight.fares.iter().map(move |fare| FareOption {
                    price: fare.total_price,
                    legs: vec![QuotedLeg {
                        departure_time: departs,
                        fare_class: Some(fare.fare_class.clone()),
                        bookable_ref: fare.fare_key.clone().map(BookableRef::new),
                    }],
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaBookingRequest<'a> {
    /// `ONE_WAY` or `ROUND_TRIP`.
    pub trip_type: &'static str,
    pub fare_keys: Vec<&'a str>,
    pub passengers: &'a [crate::domain::Passenger],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaBookingResponse {
    pub pnr: String,
    #[serde(default)]
    pub hold_expires_at: Option<DateTime<Utc>>,
}

impl AlphaBookingResponse {
    pub fn into_confirmation(self) -> Result<ReservationConfirmation, ReservationError> {
        confirmation(self.pnr, self.hold_expires_at)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlphaStatusResponse {
    #[serde(default)]
    pub pnr: Option<String>,
    pub status: String,
}

impl AlphaStatusResponse {
    pub fn status(&self) -> Result<ReservationStatus, ReservationError> {
        match self.status.trim().to_ascii_uppercase().as_str() {
            "HELD" | "HOLD" | "PENDING" => Ok(ReservationStatus::Held),
            "ISSUED" | "TICKETED" => Ok(ReservationStatus::Issued),
            "CANCELLED" | "CANCELED" => Ok(ReservationStatus::Cancelled),
            "EXPIRED" => Ok(ReservationStatus::Expired),
            other => Err(ReservationError::Unreachable(format!(
                "unknown reservation status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Beta
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct BetaSearchRequest {
    pub legs: Vec<BetaLeg>,
    pub pax: BetaPax,
}

#[derive(Debug, Clone, Serialize)]
pub struct BetaLeg {
    pub from: String,
    pub to: String,
    pub date: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BetaPax {
    pub adt: u32,
    pub chd: u32,
    pub inf: u32,
}

impl BetaSearchRequest {
    #[must_use]
    pub fn new(legs: &[Leg], counts: PassengerCounts) -> Self {
        Self {
            legs: legs
                .iter()
                .map(|leg| BetaLeg {
                    from: leg.origin.to_ascii_uppercase(),
                    to: leg.destination.to_ascii_uppercase(),
                    date: leg.date.format("%Y-%m-%d").to_string(),
                })
                .collect(),
            pax: BetaPax {
                adt: counts.adults,
                chd: counts.children,
                inf: counts.infants,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BetaSearchResponse {
    #[serde(default)]
    pub journeys: Vec<BetaJourney>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BetaJourney {
    /// Total for every passenger and segment.
    #[serde(deserialize_with = "price::deserialize")]
    pub total: i64,
    #[serde(default)]
    pub segments: Vec<BetaSegment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaSegment {
    /// Local departure, `YYYY-MM-DDTHH:MM[:SS]`.
    pub departure: String,
    #[serde(default)]
    pub fare_basis: Option<String>,
    #[serde(default)]
    pub sell_key: Option<String>,
}

impl BetaSearchResponse {
    /// One option per journey, segments in itinerary order.
    #[must_use]
    pub fn options(&self) -> Vec<FareOption> {
        self.journeys
            .iter()
            .map(|journey| FareOption {
                price: journey.total,
                legs: journey
                    .segments
                    .iter()
                    .map(|segment| QuotedLeg {
                        departure_time: departure_time(&segment.departure),
                        fare_class: segment.fare_basis.clone(),
                        bookable_ref: segment.sell_key.clone().map(BookableRef::new),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaHoldRequest<'a> {
    pub sell_keys: Vec<&'a str>,
    pub round_trip: bool,
    pub passengers: &'a [crate::domain::Passenger],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaHoldResponse {
    pub record_locator: String,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl BetaHoldResponse {
    pub fn into_confirmation(self) -> Result<ReservationConfirmation, ReservationError> {
        confirmation(self.record_locator, self.expiry)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BetaHoldStatus {
    pub state: String,
    #[serde(default)]
    pub ticketed: bool,
}

impl BetaHoldStatus {
    pub fn status(&self) -> Result<ReservationStatus, ReservationError> {
        if self.ticketed {
            return Ok(ReservationStatus::Issued);
        }
        match self.state.trim().to_ascii_lowercase().as_str() {
            "held" | "active" | "open" => Ok(ReservationStatus::Held),
            "issued" | "ticketed" => Ok(ReservationStatus::Issued),
            "cancelled" | "canceled" | "void" => Ok(ReservationStatus::Cancelled),
            "expired" | "released" => Ok(ReservationStatus::Expired),
            other => Err(ReservationError::Unreachable(format!(
                "unknown hold state '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Raw price-check response, tagged by provider.
#[derive(Debug, Clone)]
pub enum ProviderQuote {
    /// One availability response per leg, in leg order.
    Alpha(Vec<AlphaAvailabilityResponse>),
    /// Combined journeys covering every leg.
    Beta(BetaSearchResponse),
}

impl ProviderQuote {
    /// Select the option matching `legs` and produce the canonical quote.
    pub fn into_quote(self, legs: &[Leg]) -> Result<PriceQuote, FetchError> {
        match self {
            Self::Alpha(responses) => {
                if responses.len() != legs.len() {
                    return Err(FetchError::EmptyResult);
                }
                let quotes = responses
                    .iter()
                    .zip(legs)
                    .map(|(response, leg)| select_option(&response.options(), std::slice::from_ref(leg)))
                    .collect::<Result<Vec<_>, _>>()?;
                PriceQuote::combine(quotes).ok_or_else(|| {
                    FetchError::Unreachable("combined leg prices overflow".to_string())
                })
            }
            Self::Beta(response) => select_option(&response.options(), legs),
        }
    }
}

/// Prices must not be negative.
mod price {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        if value < 0 {
            return Err(serde::de::Error::custom(format!("negative price {value}")));
        }
        Ok(value)
    }
}

fn departure_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map(|dt| dt.time())
        .ok()
        .or_else(|| hhmm::parse(raw))
}

fn confirmation(
    code: String,
    expires_at: Option<DateTime<Utc>>,
) -> Result<ReservationConfirmation, ReservationError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ReservationError::Rejected(
            "provider returned an empty reservation code".into(),
        ));
    }
    Ok(ReservationConfirmation {
        code: ReservationCode::new(code),
        expires_at,
    })
}
