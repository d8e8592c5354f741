//! Scheduler configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::cycle::CycleSettings;
use crate::application::scheduler::SchedulerSettings;

/// `[scheduler]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerAppConfig {
    /// Seconds between re-syncs of the timer registry with the store.
    pub refresh_interval_secs: u64,
    /// Longest sleep in seconds when no watch is due.
    pub idle_sleep_secs: u64,
    /// Report failed automatic checks, not just manual ones.
    pub notify_automatic_failures: bool,
    /// Seconds shutdown waits for in-flight checks.
    pub shutdown_grace_secs: u64,
    /// Seconds after which another process may take over an unreleased
    /// check lease.
    pub check_lease_secs: u32,
}

impl Default for SchedulerAppConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            idle_sleep_secs: 60,
            notify_automatic_failures: true,
            shutdown_grace_secs: 10,
            check_lease_secs: 600,
        }
    }
}

impl SchedulerAppConfig {
    #[must_use]
    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            refresh_interval: Duration::from_secs(self.refresh_interval_secs),
            idle_sleep: Duration::from_secs(self.idle_sleep_secs),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        }
    }

    #[must_use]
    pub fn cycle_settings(&self) -> CycleSettings {
        CycleSettings {
            notify_automatic_failures: self.notify_automatic_failures,
            check_lease: chrono::Duration::seconds(i64::from(self.check_lease_secs)),
        }
    }
}
