use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures of a single price check against a provider.
///
/// None of these are fatal to the watch: the cycle still advances
/// `last_checked_at` and reports `checkFailed`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport or HTTP failure talking to the provider.
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    /// The provider answered with no itineraries at all.
    #[error("provider returned no itineraries")]
    EmptyResult,

    /// Itineraries were returned but none departs at the requested time.
    #[error("no itinerary matches the requested departure time")]
    NoTimeMatch,

    /// The watch lacks a field the provider requires; no request was sent.
    #[error("itinerary is missing required field: {field}")]
    IncompleteItinerary { field: &'static str },
}

/// Failures of a reservation (hold) attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    #[error("reservation service unreachable: {0}")]
    Unreachable(String),

    /// The provider refused the hold; the reason is human readable.
    #[error("reservation rejected: {0}")]
    Rejected(String),

    /// The prior reservation for this itinerary is already issued.
    #[error("prior reservation already issued")]
    AlreadyIssued,

    /// The request could not be built from the watch and quote.
    #[error("invalid reservation request: {0}")]
    InvalidRequest(String),
}

/// Watch store failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    Conflict,

    #[error("storage unreachable: {0}")]
    Unreachable(String),

    /// A stored record could not be decoded.
    #[error("stored record is invalid: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Reservation(#[from] ReservationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("scheduler is not running")]
    SchedulerStopped,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Unreachable(err.to_string())
    }
}

impl From<reqwest::Error> for ReservationError {
    fn from(err: reqwest::Error) -> Self {
        ReservationError::Unreachable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_converts_into_umbrella_error() {
        let err: Error = StorageError::NotFound.into();
        assert!(matches!(err, Error::Storage(StorageError::NotFound)));
        assert_eq!(err.to_string(), "record not found");
    }

    #[test]
    fn fetch_error_messages_are_stable() {
        assert_eq!(
            FetchError::IncompleteItinerary { field: "date" }.to_string(),
            "itinerary is missing required field: date"
        );
        assert_eq!(
            FetchError::NoTimeMatch.to_string(),
            "no itinerary matches the requested departure time"
        );
    }
}
