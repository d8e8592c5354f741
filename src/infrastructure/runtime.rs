//! Scheduler runtime entry point.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::bootstrap;
use crate::application::scheduler::Scheduler;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::store::WatchStore;

/// Wire the engine from `config` over `store` and run the scheduler until
/// `shutdown` flips to true.
///
/// # Errors
/// Returns an error if a provider URL is invalid or the initial load of
/// active watches fails.
pub async fn run_with_shutdown(
    config: Config,
    store: Arc<dyn WatchStore>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let engine = bootstrap::build_engine(&config, store)?;

    let (scheduler, _handle) = Scheduler::new(
        engine.cycle,
        engine.store,
        engine.clock,
        engine.guard,
        config.scheduler.scheduler_settings(),
    );

    info!(
        refresh_interval_secs = config.scheduler.refresh_interval_secs,
        "Scheduler wired"
    );
    scheduler.run(shutdown).await
}
