//! Provider routing and local itinerary checks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::alpha::AlphaClient;
use super::beta::BetaClient;
use super::settings::{ProviderConfig, ProvidersConfig};
use crate::domain::{
    PriceQuote, Provider, ReservationCode, ReservationConfirmation, ReservationRequest,
    ReservationStatus, Watch,
};
use crate::error::{FetchError, ReservationError};
use crate::port::outbound::fetch::PriceFetcher;
use crate::port::outbound::reservation::ReservationGateway;

/// Reject itineraries a provider cannot price, before any request is sent.
pub(crate) fn require_complete(watch: &Watch) -> Result<(), FetchError> {
    let itinerary = &watch.itinerary;
    if itinerary.legs.is_empty() {
        return Err(FetchError::IncompleteItinerary { field: "legs" });
    }
    if itinerary.round_trip && itinerary.legs.len() < 2 {
        return Err(FetchError::IncompleteItinerary {
            field: "return_leg",
        });
    }
    for leg in &itinerary.legs {
        if leg.origin.trim().is_empty() {
            return Err(FetchError::IncompleteItinerary { field: "origin" });
        }
        if leg.destination.trim().is_empty() {
            return Err(FetchError::IncompleteItinerary {
                field: "destination",
            });
        }
    }
    Ok(())
}

/// Routes price checks and holds to the client for the watch's provider.
#[derive(Default)]
pub struct ProviderRouter {
    fetchers: HashMap<Provider, Arc<dyn PriceFetcher>>,
    gateways: HashMap<Provider, Arc<dyn ReservationGateway>>,
}

impl ProviderRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` for both price checks and holds at `provider`.
    #[must_use]
    pub fn with_provider<C>(mut self, provider: Provider, client: Arc<C>) -> Self
    where
        C: PriceFetcher + ReservationGateway + 'static,
    {
        self.fetchers.insert(provider, client.clone());
        self.gateways.insert(provider, client);
        self
    }

    /// Build clients for every configured provider.
    ///
    /// # Errors
    /// Returns an error if a configured API URL is invalid.
    pub fn from_config(config: &ProvidersConfig) -> Result<Self, url::ParseError> {
        let mut router = Self::new();
        if let Some(alpha) = &config.alpha {
            router = router.with_provider(Provider::Alpha, Arc::new(AlphaClient::new(alpha)?));
        }
        if let Some(beta) = &config.beta {
            router = router.with_provider(Provider::Beta, Arc::new(BetaClient::new(beta)?));
        }
        info!(providers = ?router.providers(), "Provider clients configured");
        Ok(router)
    }

    /// Providers with a registered client.
    #[must_use]
    pub fn providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.fetchers.contains_key(p))
            .collect()
    }
}

#[async_trait]
impl PriceFetcher for ProviderRouter {
    async fn check_price(&self, watch: &Watch) -> Result<PriceQuote, FetchError> {
        let provider = watch.provider();
        let fetcher = self.fetchers.get(&provider).ok_or_else(|| {
            FetchError::Unreachable(format!("provider {provider} is not configured"))
        })?;
        fetcher.check_price(watch).await
    }
}

#[async_trait]
impl ReservationGateway for ProviderRouter {
    async fn create_hold(
        &self,
        request: &ReservationRequest,
    ) -> Result<ReservationConfirmation, ReservationError> {
        self.gateway(request.provider)?.create_hold(request).await
    }

    async fn reservation_status(
        &self,
        provider: Provider,
        code: &ReservationCode,
    ) -> Result<ReservationStatus, ReservationError> {
        self.gateway(provider)?
            .reservation_status(provider, code)
            .await
    }
}

impl ProviderRouter {
    fn gateway(&self, provider: Provider) -> Result<&Arc<dyn ReservationGateway>, ReservationError> {
        self.gateways.get(&provider).ok_or_else(|| {
            ReservationError::Unreachable(format!("provider {provider} is not configured"))
        })
    }
}
