//! Unified operator capability surface for inbound adapters.

use super::runtime::RuntimeOperator;
use super::watch::WatchOperator;

/// Unified operator capability surface consumed by inbound adapters.
pub trait OperatorPort: RuntimeOperator + WatchOperator {}

impl<T> OperatorPort for T where T: RuntimeOperator + WatchOperator {}
