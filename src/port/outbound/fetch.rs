//! Price-check port.

use async_trait::async_trait;

use crate::domain::{PriceQuote, Watch};
use crate::error::FetchError;

/// Prices a watch's itinerary against a provider.
///
/// Implementations validate the itinerary locally before any network call,
/// and return a canonical [`PriceQuote`] regardless of the provider's
/// response shape.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Run one price check for `watch`.
    async fn check_price(&self, watch: &Watch) -> Result<PriceQuote, FetchError>;
}
