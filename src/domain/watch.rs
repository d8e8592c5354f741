//! The watch record and its partial-update patch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{BookableRef, OwnerId, ReservationCode, WatchId};
use super::itinerary::{Itinerary, Provider};
use super::passenger::Manifest;

/// A monitored itinerary with its auto-hold policy and observed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watch {
    #[serde(default)]
    pub id: WatchId,
    pub owner: OwnerId,
    pub itinerary: Itinerary,
    pub check_interval_secs: u64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub auto_hold: bool,
    #[serde(default)]
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Last persisted price, in the provider's currency minor-less units.
    #[serde(default)]
    pub current_price: Option<i64>,
    /// Bookable references saved alongside `current_price`, one per leg.
    #[serde(default)]
    pub bookable_refs: Vec<BookableRef>,
    /// Reservation this watch was imported from, superseded on a new hold.
    #[serde(default)]
    pub prior_reservation: Option<ReservationCode>,
    #[serde(default)]
    pub manifest: Manifest,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Watch {
    /// Create an active, never-checked watch with auto-hold off.
    pub fn new(owner: impl Into<String>, itinerary: Itinerary, check_interval_secs: u64) -> Self {
        Self {
            id: WatchId::new(),
            owner: OwnerId::new(owner),
            itinerary,
            check_interval_secs,
            active: true,
            auto_hold: false,
            last_checked_at: None,
            current_price: None,
            bookable_refs: Vec::new(),
            prior_reservation: None,
            manifest: Manifest::default(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<WatchId>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = manifest;
        self
    }

    #[must_use]
    pub fn with_auto_hold(mut self, enabled: bool) -> Self {
        self.auto_hold = enabled;
        self
    }

    /// Mark the watch as imported from an existing reservation.
    #[must_use]
    pub fn from_reservation(mut self, code: ReservationCode) -> Self {
        self.prior_reservation = Some(code);
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: i64) -> Self {
        self.current_price = Some(price);
        self
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.itinerary.provider
    }

    /// Validate invariants enforced at creation and update time.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.itinerary.validate()?;
        let minimum = self.provider().min_check_interval_secs();
        if self.check_interval_secs < minimum {
            return Err(DomainError::IntervalBelowMinimum {
                interval: self.check_interval_secs,
                minimum,
            });
        }
        Ok(())
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: &WatchPatch) {
        if let Some(at) = patch.last_checked_at {
            self.last_checked_at = Some(at);
        }
        if let Some(price) = patch.current_price {
            self.current_price = Some(price);
        }
        if let Some(ref refs) = patch.bookable_refs {
            self.bookable_refs = refs.clone();
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }
}

/// Partial update of the mutable watch fields.
///
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchPatch {
    pub last_checked_at: Option<DateTime<Utc>>,
    pub current_price: Option<i64>,
    pub bookable_refs: Option<Vec<BookableRef>>,
    pub active: Option<bool>,
}

impl WatchPatch {
    /// Patch that only advances `last_checked_at`.
    #[must_use]
    pub fn checked_at(at: DateTime<Utc>) -> Self {
        Self {
            last_checked_at: Some(at),
            ..Self::default()
        }
    }

    /// Also persist a price and its bookable references.
    #[must_use]
    pub fn with_price(mut self, price: i64, refs: Vec<BookableRef>) -> Self {
        self.current_price = Some(price);
        self.bookable_refs = Some(refs);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_checked_at.is_none()
            && self.current_price.is_none()
            && self.bookable_refs.is_none()
            && self.active.is_none()
    }
}
