//! Beta provider client.
//!
//! Beta searches whole itineraries at once. Its sell keys expire within
//! minutes, so its prices are advisory.

use async_trait::async_trait;
use tracing::debug;

use super::dto::{
    BetaHoldRequest, BetaHoldResponse, BetaHoldStatus, BetaSearchRequest, BetaSearchResponse,
    ProviderQuote,
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

const API_KEY_HEADER: &str = "X-Api-Key";

pub struct BetaClient {
    http: ProviderHttp,
}

impl BetaClient {
    /// Build a client from its config section.
    ///
    /// # Errors
    /// Returns an error if the configured API URL is invalid.
    pub fn new(config: &ProviderConfig) -> Result<Self, url::ParseError> {
        let auth = config.api_key.clone().map_or(Auth::None, |value| Auth::Header {
            name: API_KEY_HEADER,
            value,
        });
        Ok(Self {
            http: ProviderHttp::from_config(config, auth)?,
        })
    }
}

#[async_trait]
impl PriceFetcher for BetaClient {
    async fn check_price(&self, watch: &Watch) -> Result<PriceQuote, FetchError> {
        require_complete(watch)?;
        let request = BetaSearchRequest::new(&watch.itinerary.legs, watch.manifest.pricing_counts());
        let response: BetaSearchResponse = self.http.post_json("search", &request).await?;

        debug!(watch_id = %watch.id, journeys = response.journeys.len(), "Beta search received");
        ProviderQuote::Beta(response).into_quote(&watch.itinerary.legs)
    }
}

#[async_trait]
impl ReservationGateway for BetaClient {
    async fn create_hold(
        &self,
        request: &ReservationRequest,
    ) -> Result<ReservationConfirmation, ReservationError> {
        if request.provider != Provider::Beta {
            return Err(ReservationError::InvalidRequest(format!(
                "request for {} sent to beta",
                request.provider
            )));
        }
        let body = BetaHoldRequest {
            sell_keys: request.bookable_refs.iter().map(|r| r.as_str()).collect(),
            round_trip: request.round_trip,
            passengers: request.manifest.passengers(),
        };
        let response: BetaHoldResponse = self.http.post_json_once("holds", &body).await?;
        response.into_confirmation()
    }

    async fn reservation_status(
        &self,
        _provider: Provider,
        code: &ReservationCode,
    ) -> Result<ReservationStatus, ReservationError> {
        let response: BetaHoldStatus = self
            .http
            .get_json(&format!("holds/{}", code.as_str()))
            .await?;
        response.status()
    }
}
