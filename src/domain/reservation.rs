//! Reservation (hold) requests, confirmations and records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{BookableRef, OwnerId, ReservationCode, WatchId};
use super::itinerary::{Itinerary, Provider};
use super::passenger::Manifest;
use super::watch::Watch;
use crate::error::ReservationError;

/// Request sent to a provider to place a hold.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRequest {
    pub provider: Provider,
    /// One reference per leg, in leg order.
    pub bookable_refs: Vec<BookableRef>,
    pub round_trip: bool,
    pub manifest: Manifest,
}

impl ReservationRequest {
    /// Build the request for `watch` using the quoted references.
    pub fn build(watch: &Watch, refs: Vec<BookableRef>) -> Result<Self, ReservationError> {
        if watch.manifest.is_empty() {
            return Err(ReservationError::InvalidRequest(
                "passenger manifest is empty".into(),
            ));
        }
        let legs = watch.itinerary.legs.len();
        if refs.len() != legs {
            return Err(ReservationError::InvalidRequest(format!(
                "expected {legs} bookable reference(s), got {}",
                refs.len()
            )));
        }
        Ok(Self {
            provider: watch.provider(),
            bookable_refs: refs,
            round_trip: watch.itinerary.round_trip,
            manifest: watch.manifest.clone(),
        })
    }
}

/// Successful hold returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationConfirmation {
    pub code: ReservationCode,
    /// When the provider releases the hold if unpaid.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of an existing reservation at the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Held, awaiting payment.
    Held,
    /// Paid and ticketed.
    Issued,
    Cancelled,
    Expired,
}

impl ReservationStatus {
    /// True once the reservation can no longer be replaced.
    #[must_use]
    pub const fn is_finalized(self) -> bool {
        matches!(self, Self::Issued)
    }
}

/// Persisted reservation produced by a successful auto-hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub code: ReservationCode,
    pub watch_id: WatchId,
    pub owner: OwnerId,
    pub itinerary: Itinerary,
    pub manifest: Manifest,
    pub bookable_refs: Vec<BookableRef>,
    pub price: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Set when a later reservation replaced this one.
    #[serde(default)]
    pub superseded_by: Option<ReservationCode>,
}

impl ReservationRecord {
    /// Snapshot the watch and the confirmed hold.
    #[must_use]
    pub fn new(
        watch: &Watch,
        request: &ReservationRequest,
        confirmation: &ReservationConfirmation,
        price: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code: confirmation.code.clone(),
            watch_id: watch.id.clone(),
            owner: watch.owner.clone(),
            itinerary: watch.itinerary.clone(),
            manifest: watch.manifest.clone(),
            bookable_refs: request.bookable_refs.clone(),
            price,
            expires_at: confirmation.expires_at,
            created_at,
            superseded_by: None,
        }
    }
}

/// Result of one reservation attempt, reported to the scheduler and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationAttempt {
    pub provider: Provider,
    pub bookable_refs: Vec<BookableRef>,
    pub result: Result<ReservationConfirmation, String>,
}

impl ReservationAttempt {
    /// Record the outcome of sending `request`.
    #[must_use]
    pub fn new(request: &ReservationRequest, result: Result<ReservationConfirmation, String>) -> Self {
        Self {
            provider: request.provider,
            bookable_refs: request.bookable_refs.clone(),
            result,
        }
    }

    /// Reservation code when the attempt succeeded.
    #[must_use]
    pub fn code(&self) -> Option<&ReservationCode> {
        self.result.as_ref().ok().map(|c| &c.code)
    }
}
