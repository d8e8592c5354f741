//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a watch.
///
/// Generated as UUID v4 for new watches, or constructed from an
/// existing string for persistence/deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WatchId(String);

impl WatchId {
    /// Create a new `WatchId` with a generated UUID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the watch ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WatchId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WatchId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of the user who owns a watch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create a new `OwnerId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the owner ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Provider-issued reservation (PNR) code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct ReservationCode(String);

impl ReservationCode {
    /// Create a new reservation code. Codes are case-insensitive, stored upper-case.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    /// Get the reservation code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReservationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ReservationCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ReservationCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Provider token required to turn a quoted fare into a reservation.
///
/// Opaque to the engine; only forwarded to the reservation service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookableRef(String);

impl BookableRef {
    /// Create a new bookable reference.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the provider sent an empty token.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for BookableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BookableRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_ids_are_unique() {
        assert_ne!(WatchId::new(), WatchId::new());
    }

    #[test]
    fn reservation_code_is_normalized() {
        assert_eq!(ReservationCode::new(" abc123 ").as_str(), "ABC123");
        assert_eq!(ReservationCode::from("xyz"), ReservationCode::from("XYZ"));
    }

    #[test]
    fn blank_bookable_ref_is_detected() {
        assert!(BookableRef::new("  ").is_blank());
        assert!(!BookableRef::new("fk-1").is_blank());
    }
}
