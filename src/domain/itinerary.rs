//! Providers, legs, and itineraries.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::policy::PersistencePolicy;

/// Minimum seconds between two checks of the same watch, per provider.
const DEFAULT_MIN_CHECK_INTERVAL_SECS: u64 = 300;

/// Airline inventory services a watch can be priced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Returns an authoritative price with a durable fare key.
    Alpha,
    /// Returns an advisory price whose sell keys expire quickly.
    Beta,
}

impl Provider {
    /// Every supported provider.
    pub const ALL: [Provider; 2] = [Provider::Alpha, Provider::Beta];

    /// How quotes from this provider may be written back to the watch.
    #[must_use]
    pub const fn persistence(self) -> PersistencePolicy {
        match self {
            Self::Alpha => PersistencePolicy::Authoritative,
            Self::Beta => PersistencePolicy::Advisory,
        }
    }

    /// Smallest check interval accepted at watch creation.
    #[must_use]
    pub const fn min_check_interval_secs(self) -> u64 {
        match self {
            Self::Alpha | Self::Beta => DEFAULT_MIN_CHECK_INTERVAL_SECS,
        }
    }

    /// Stable lowercase name used in config, storage and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alpha" => Ok(Self::Alpha),
            "beta" => Ok(Self::Beta),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

/// One directional flight leg of a watched itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// IATA code of the departure airport.
    pub origin: String,
    /// IATA code of the arrival airport.
    pub destination: String,
    /// Local departure date.
    pub date: NaiveDate,
    /// Exact departure time; when set, only flights leaving at this time match.
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<NaiveTime>,
    /// Fare class (booking class) the watch is restricted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fare_class: Option<String>,
}

impl Leg {
    /// Create a leg with no time or fare-class restriction.
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            date,
            departure_time: None,
            fare_class: None,
        }
    }

    /// Restrict the leg to one exact departure time.
    #[must_use]
    pub fn at(mut self, time: NaiveTime) -> Self {
        self.departure_time = Some(time);
        self
    }

    /// Restrict the leg to one fare class.
    #[must_use]
    pub fn in_class(mut self, fare_class: impl Into<String>) -> Self {
        self.fare_class = Some(fare_class.into());
        self
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{} {}", self.origin, self.destination, self.date)?;
        if let Some(time) = self.departure_time {
            write!(f, " {}", time.format("%H:%M"))?;
        }
        Ok(())
    }
}

/// The travel description a watch prices: provider plus one or two legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub provider: Provider,
    pub legs: Vec<Leg>,
    #[serde(default)]
    pub round_trip: bool,
}

impl Itinerary {
    /// One-way itinerary.
    #[must_use]
    pub fn one_way(provider: Provider, leg: Leg) -> Self {
        Self {
            provider,
            legs: vec![leg],
            round_trip: false,
        }
    }

    /// Round-trip itinerary.
    #[must_use]
    pub fn round_trip(provider: Provider, outbound: Leg, inbound: Leg) -> Self {
        Self {
            provider,
            legs: vec![outbound, inbound],
            round_trip: true,
        }
    }

    /// Exact departure times requested per leg, in leg order.
    #[must_use]
    pub fn requested_times(&self) -> Vec<Option<NaiveTime>> {
        self.legs.iter().map(|leg| leg.departure_time).collect()
    }

    /// Check the leg shape and routes.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.legs.is_empty() {
            return Err(DomainError::NoLegs);
        }
        let expected = if self.round_trip { 2 } else { 1 };
        if self.legs.len() != expected {
            return Err(DomainError::LegCountMismatch {
                round_trip: self.round_trip,
                legs: self.legs.len(),
            });
        }
        for (index, leg) in self.legs.iter().enumerate() {
            if leg.origin.trim().is_empty() || leg.destination.trim().is_empty() {
                return Err(DomainError::InvalidRoute {
                    leg: index,
                    reason: "airport code is empty",
                });
            }
            if leg.origin.eq_ignore_ascii_case(&leg.destination) {
                return Err(DomainError::InvalidRoute {
                    leg: index,
                    reason: "origin equals destination",
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let legs: Vec<String> = self.legs.iter().map(ToString::to_string).collect();
        write!(f, "[{}] {}", self.provider, legs.join(" / "))
    }
}

/// Serde helpers for `HH:MM` departure times (seconds accepted on input).
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{raw}'"))),
        }
    }
}
