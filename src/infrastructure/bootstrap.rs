//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tracing::{info, warn};

#[cfg(feature = "telegram")]
use crate::adapter::outbound::notifier::telegram::notifier::{TelegramConfig, TelegramNotifier};
use crate::adapter::outbound::notifier::log::LogNotifier;
use crate::adapter::outbound::provider::router::ProviderRouter;
use crate::adapter::outbound::sqlite::database::connection;
use crate::adapter::outbound::sqlite::SqliteWatchStore;
use crate::application::cycle::CheckCycle;
use crate::application::hold::AutoHoldOrchestrator;
use crate::application::state::CycleGuard;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::clock::{Clock, MonotonicClock};
use crate::port::outbound::notifier::NotifierRegistry;
use crate::port::outbound::store::WatchStore;

/// Everything a check cycle needs, wired from configuration.
pub(crate) struct Engine {
    pub store: Arc<dyn WatchStore>,
    pub clock: Arc<dyn Clock>,
    pub cycle: Arc<CheckCycle>,
    pub guard: CycleGuard,
}

/// Open (and migrate) the SQLite watch store.
pub(crate) fn open_store(config: &Config) -> Result<Arc<dyn WatchStore>> {
    let pool = connection::open(&config.database)?;
    info!(database = %config.database, "Database initialized");
    Ok(Arc::new(SqliteWatchStore::new(pool)))
}

/// Build notifier registry from configuration.
#[cfg(feature = "telegram")]
pub(crate) fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));

    if config.telegram.enabled {
        if let Some(tg_config) = TelegramConfig::from_env() {
            let tg_config = TelegramConfig {
                notify_price_changes: config.telegram.notify_price_changes,
                notify_holds: config.telegram.notify_holds,
                notify_failures: config.telegram.notify_failures,
                ..tg_config
            };
            registry.register(Box::new(TelegramNotifier::new(tg_config)));
            info!("Telegram notifier enabled");
        } else {
            warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
    }

    registry
}

/// Build notifier registry from configuration (non-telegram variant).
#[cfg(not(feature = "telegram"))]
pub(crate) fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    if config.telegram.enabled {
        warn!("Telegram enabled in config but the telegram feature is not compiled in");
    }
    registry
}

/// Build provider clients for every configured provider.
pub(crate) fn build_provider_router(config: &Config) -> Result<Arc<ProviderRouter>> {
    let router = ProviderRouter::from_config(&config.providers)?;
    if router.providers().is_empty() {
        warn!("No provider configured, every check will fail");
    }
    Ok(Arc::new(router))
}

/// Wire the check cycle against `store`.
pub(crate) fn build_engine(config: &Config, store: Arc<dyn WatchStore>) -> Result<Engine> {
    let router = build_provider_router(config)?;
    let notifiers = Arc::new(build_notifier_registry(config));
    info!(notifiers = notifiers.len(), "Notifiers initialized");

    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
    let hold = AutoHoldOrchestrator::new(
        router.clone(),
        Arc::clone(&store),
        Arc::clone(&notifiers),
        Arc::clone(&clock),
    );
    let cycle = Arc::new(CheckCycle::new(
        router,
        Arc::clone(&store),
        notifiers,
        Arc::clone(&clock),
        hold,
        config.scheduler.cycle_settings(),
    ));

    Ok(Engine {
        store,
        clock,
        cycle,
        guard: CycleGuard::new(),
    })
}
