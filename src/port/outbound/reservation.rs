//! Reservation port: hold creation and status lookup.

use async_trait::async_trait;

use crate::domain::{
    Provider, ReservationCode, ReservationConfirmation, ReservationRequest, ReservationStatus,
};
use crate::error::ReservationError;

/// Places holds and reports the state of existing reservations.
#[async_trait]
pub trait ReservationGateway: Send + Sync {
    /// Place a time-limited hold for the request's itinerary and passengers.
    async fn create_hold(
        &self,
        request: &ReservationRequest,
    ) -> Result<ReservationConfirmation, ReservationError>;

    /// Look up an existing reservation at `provider`.
    async fn reservation_status(
        &self,
        provider: Provider,
        code: &ReservationCode,
    ) -> Result<ReservationStatus, ReservationError>;
}
