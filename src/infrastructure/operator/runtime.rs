//! Runtime operator implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use crate::adapter::outbound::memory::MemoryWatchStore;
use crate::domain::Watch;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::runtime::run_with_shutdown;
use crate::port::inbound::operator::runtime::{RunRequest, RunStartupSnapshot, RuntimeOperator};
use crate::port::outbound::store::WatchStore;

use super::{entry::Operator, shared};

#[async_trait]
impl RuntimeOperator for Operator {
    fn prepare_run(&self, request: &RunRequest) -> Result<RunStartupSnapshot> {
        let config = self.load_run_config(request)?;
        Ok(RunStartupSnapshot {
            providers: config
                .provider_sections()
                .into_iter()
                .map(|(provider, _)| provider.to_string())
                .collect(),
            telegram_enabled: config.telegram.enabled,
            refresh_interval_secs: config.scheduler.refresh_interval_secs,
            database: if request.memory_watches_json.is_some() {
                MEMORY_DATABASE.to_string()
            } else {
                config.database
            },
        })
    }

    async fn execute_run(&self, request: RunRequest) -> Result<()> {
        let config = self.load_run_config(&request)?;
        config.init_logging();

        let store: Arc<dyn WatchStore> = match request.memory_watches_json.as_deref() {
            Some(json) => Arc::new(Self::memory_store(json)?),
            None => bootstrap::open_store(&config)?,
        };

        info!(
            database = %config.database,
            memory = request.memory_watches_json.is_some(),
            providers = config.provider_sections().len(),
            "farewatch starting"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut app_handle =
            tokio::spawn(async move { run_with_shutdown(config, store, shutdown_rx).await });

        tokio::select! {
            result = &mut app_handle => {
                shared::map_app_result(result)?;
                info!("farewatch stopped");
                return Ok(());
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received (Ctrl+C)");
                let _ = shutdown_tx.send(true);
            }
        }

        shared::map_app_result(app_handle.await)?;
        info!("farewatch stopped");
        Ok(())
    }
}

const MEMORY_DATABASE: &str = ":memory:";

impl Operator {
    fn memory_store(json: &str) -> Result<MemoryWatchStore> {
        let watches: Vec<Watch> = serde_json::from_str(json)?;
        for watch in &watches {
            watch.validate()?;
        }
        Ok(MemoryWatchStore::with_watches(watches))
    }

    fn load_run_config(&self, request: &RunRequest) -> Result<Config> {
        let mut config = shared::parse_config(&request.config_toml)?;
        Self::apply_run_overrides(&mut config, request);
        Ok(config)
    }

    fn apply_run_overrides(config: &mut Config, request: &RunRequest) {
        if let Some(ref log_level) = request.log_level {
            config.logging.level = log_level.clone();
        }

        if request.json_logs {
            config.logging.format = "json".to_string();
        }

        if request.telegram_enabled {
            config.telegram.enabled = true;
        }

        if let Some(ref database_path) = request.database_path {
            config.database = database_path.clone();
        }
    }
}
