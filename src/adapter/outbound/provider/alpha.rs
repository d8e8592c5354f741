//! Alpha provider client.
//!
//! Alpha prices each leg separately and returns a durable fare key per fare,
//! so its prices are authoritative.

use async_trait::async_trait;
use futures_util::future::try_join_all;
use tracing::debug;

use super::dto::{
    AlphaAvailabilityRequest, AlphaAvailabilityResponse, AlphaBookingRequest,
    AlphaBookingResponse, AlphaStatusResponse, ProviderQuote,
};
use super::http::{Auth, ProviderHttp};
use super::router::require_complete;
use super::settings::ProviderConfig;
use crate::domain::{
    PriceQuote, Provider, ReservationCode, ReservationConfirmation, ReservationRequest,
    ReservationStatus, Watch,
};
use crate::error::{FetchError, ReservationError};
use crate::port::outbound::fetch::PriceFetcher;
use crate::port::outbound::reservation::ReservationGateway;

pub struct AlphaClient {
    http: ProviderHttp,
}

impl AlphaClient {
    /// Build a client from its config section.
    ///
    /// # Errors
    /// Returns an error if the configured API URL is invalid.
    pub fn new(config: &ProviderConfig) -> Result<Self, url::ParseError> {
        let auth = config
            .api_key
            .clone()
            .map_or(Auth::None, Auth::Bearer);
        Ok(Self {
            http: ProviderHttp::from_config(config, auth)?,
        })
    }
}

#[async_trait]
impl PriceFetcher for AlphaClient {
    async fn check_price(&self, watch: &Watch) -> Result<PriceQuote, FetchError> {
        require_complete(watch)?;
        let counts = watch.manifest.pricing_counts();

        let responses = try_join_all(watch.itinerary.legs.iter().map(|leg| {
            let request = AlphaAvailabilityRequest::new(leg, counts);
            async move {
                self.http
                    .post_json::<_, AlphaAvailabilityResponse>("availability", &request)
                    .await
            }
        }))
        .await?;

        debug!(
            watch_id = %watch.id,
            flights = responses.iter().map(|r| r.flights.len()).sum::<usize>(),
            "Alpha availability received"
        );
        ProviderQuote::Alpha(responses).into_quote(&watch.itinerary.legs)
    }
}

#[async_trait]
impl ReservationGateway for AlphaClient {
    async fn create_hold(
        &self,
        request: &ReservationRequest,
    ) -> Result<ReservationConfirmation, ReservationError> {
        if request.provider != Provider::Alpha {
            return Err(ReservationError::InvalidRequest(format!(
                "request for {} sent to alpha",
                request.provider
            )));
        }
        let body = AlphaBookingRequest {
            trip_type: if request.round_trip {
                "ROUND_TRIP"
            } else {
                "ONE_WAY"
            },
            fare_keys: request.bookable_refs.iter().map(|r| r.as_str()).collect(),
            passengers: request.manifest.passengers(),
        };
        let response: AlphaBookingResponse = self.http.post_json_once("bookings", &body).await?;
        response.into_confirmation()
    }

    async fn reservation_status(
        &self,
        _provider: Provider,
        code: &ReservationCode,
    ) -> Result<ReservationStatus, ReservationError> {
        let response: AlphaStatusResponse = self
            .http
            .get_json(&format!("bookings/{}", code.as_str()))
            .await?;
        response.status()
    }
}
