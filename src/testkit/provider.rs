//! Scripted provider fakes.
//!
//! - [`ScriptedFetcher`] — Per-watch queues of price-check results, an
//!   optional artificial latency, and call/concurrency counters.
//! - [`ScriptedReservations`] — Queued hold and status results with a
//!   record of every hold request.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{
    PriceQuote, Provider, ReservationCode, ReservationConfirmation, ReservationRequest,
    ReservationStatus, Watch, WatchId,
};
use crate::error::{FetchError, ReservationError};
use crate::port::outbound::fetch::PriceFetcher;
use crate::port::outbound::reservation::ReservationGateway;

// ---------------------------------------------------------------------------
// ScriptedFetcher
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FetcherState {
    scripts: HashMap<WatchId, VecDeque<Result<PriceQuote, FetchError>>>,
    calls: HashMap<WatchId, usize>,
    in_flight: HashMap<WatchId, usize>,
    max_in_flight: HashMap<WatchId, usize>,
}

/// A price fetcher that replays queued results per watch.
///
/// When a watch's queue is exhausted the fetcher returns
/// `FetchError::EmptyResult`.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    state: Arc<Mutex<FetcherState>>,
    delay: Option<Duration>,
    total_calls: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every call (tokio time, so pausable).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue results for `id`, returned in order.
    pub fn script(&self, id: &str, results: Vec<Result<PriceQuote, FetchError>>) {
        self.state
            .lock()
            .scripts
            .entry(WatchId::from(id))
            .or_default()
            .extend(results);
    }

    /// Queue the same successful quote `times` times.
    pub fn repeat(&self, id: &str, quote: PriceQuote, times: usize) {
        self.script(id, vec![Ok(quote); times]);
    }

    /// Calls made for `id`.
    pub fn calls(&self, id: &str) -> usize {
        self.state
            .lock()
            .calls
            .get(&WatchId::from(id))
            .copied()
            .unwrap_or(0)
    }

    /// Calls made across every watch.
    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls observed for `id`.
    pub fn max_concurrency(&self, id: &str) -> usize {
        self.state
            .lock()
            .max_in_flight
            .get(&WatchId::from(id))
            .copied()
            .unwrap_or(0)
    }

    fn enter(&self, id: &WatchId) -> Result<PriceQuote, FetchError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        *state.calls.entry(id.clone()).or_default() += 1;

        let current = {
            let in_flight = state.in_flight.entry(id.clone()).or_default();
            *in_flight += 1;
            *in_flight
        };
        let max = state.max_in_flight.entry(id.clone()).or_default();
        *max = (*max).max(current);

        state
            .scripts
            .get_mut(id)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Err(FetchError::EmptyResult))
    }

    fn leave(&self, id: &WatchId) {
        if let Some(in_flight) = self.state.lock().in_flight.get_mut(id) {
            *in_flight = in_flight.saturating_sub(1);
        }
    }
}

#[async_trait]
impl PriceFetcher for ScriptedFetcher {
    async fn check_price(&self, watch: &Watch) -> Result<PriceQuote, FetchError> {
        let result = self.enter(&watch.id);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.leave(&watch.id);
        result
    }
}

// ---------------------------------------------------------------------------
// ScriptedReservations
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ReservationState {
    holds: VecDeque<Result<ReservationConfirmation, ReservationError>>,
    statuses: VecDeque<Result<ReservationStatus, ReservationError>>,
    requests: Vec<ReservationRequest>,
    status_lookups: Vec<ReservationCode>,
}

/// A reservation gateway with queued results.
///
/// Exhausted hold queues confirm `HOLD{n}`; exhausted status queues report
/// `Held`.
#[derive(Clone, Default)]
pub struct ScriptedReservations {
    state: Arc<Mutex<ReservationState>>,
}

impl ScriptedReservations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_hold(&self, result: Result<ReservationConfirmation, ReservationError>) {
        self.state.lock().holds.push_back(result);
    }

    pub fn push_status(&self, result: Result<ReservationStatus, ReservationError>) {
        self.state.lock().statuses.push_back(result);
    }

    /// Every hold request received, in order.
    pub fn requests(&self) -> Vec<ReservationRequest> {
        self.state.lock().requests.clone()
    }

    pub fn hold_calls(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Codes whose status was looked up, in order.
    pub fn status_lookups(&self) -> Vec<ReservationCode> {
        self.state.lock().status_lookups.clone()
    }
}

#[async_trait]
impl ReservationGateway for ScriptedReservations {
    async fn create_hold(
        &self,
        request: &ReservationRequest,
    ) -> Result<ReservationConfirmation, ReservationError> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());
        let n = state.requests.len();
        state.holds.pop_front().unwrap_or_else(|| {
            Ok(ReservationConfirmation {
                code: ReservationCode::new(format!("HOLD{n}")),
                expires_at: None,
            })
        })
    }

    async fn reservation_status(
        &self,
        _provider: Provider,
        code: &ReservationCode,
    ) -> Result<ReservationStatus, ReservationError> {
        let mut state = self.state.lock();
        state.status_lookups.push(code.clone());
        state
            .statuses
            .pop_front()
            .unwrap_or(Ok(ReservationStatus::Held))
    }
}
