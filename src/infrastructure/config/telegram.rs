//! Telegram notification configuration.

use serde::Deserialize;

const fn default_true() -> bool {
    true
}

/// Telegram notification configuration.
///
/// The bot token and chat ID come from `TELEGRAM_BOT_TOKEN` and
/// `TELEGRAM_CHAT_ID`, never from the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramAppConfig {
    /// Enable telegram notifications.
    #[serde(default)]
    pub enabled: bool,
    /// Send price decrease/increase/unchanged alerts.
    #[serde(default = "default_true")]
    pub notify_price_changes: bool,
    /// Send hold outcome alerts.
    #[serde(default = "default_true")]
    pub notify_holds: bool,
    /// Send failed check alerts.
    #[serde(default = "default_true")]
    pub notify_failures: bool,
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            notify_price_changes: default_true(),
            notify_holds: default_true(),
            notify_failures: default_true(),
        }
    }
}
