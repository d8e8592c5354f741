//! Telegram notifier.
//!
//! Provides the [`TelegramNotifier`], which queues events onto a background
//! worker so the check cycle never waits on the Bot API.
//!
//! Requires the `telegram` feature to be enabled.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::port::outbound::notifier::{Event, Notifier};

use super::format::format_event_message;

/// Configuration for the Telegram notifier.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token obtained from BotFather.
    pub bot_token: String,
    /// Target chat ID for notifications.
    pub chat_id: i64,
    /// Send price decrease/increase/unchanged messages.
    pub notify_price_changes: bool,
    /// Send hold succeeded/failed/skipped messages.
    pub notify_holds: bool,
    /// Send failed check messages.
    pub notify_failures: bool,
}

impl TelegramConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`. Returns `None` if
    /// either is missing or the chat ID is not a number. Every message kind
    /// starts enabled.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .and_then(|s| s.trim().parse().ok())?;

        Some(Self {
            bot_token,
            chat_id,
            notify_price_changes: true,
            notify_holds: true,
            notify_failures: true,
        })
    }
}

/// Telegram notifier that sends messages to a chat.
pub struct TelegramNotifier {
    sender: mpsc::UnboundedSender<Event>,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier and spawn the background worker.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(telegram_worker(config, receiver));
        Self { sender }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, event: Event) {
        if self.sender.send(event).is_err() {
            warn!("Telegram notifier channel closed");
        }
    }
}

async fn telegram_worker(config: TelegramConfig, mut receiver: mpsc::UnboundedReceiver<Event>) {
    let bot = Bot::new(&config.bot_token);
    let chat_id = ChatId(config.chat_id);

    info!(chat_id = config.chat_id, "Telegram notifier started");

    while let Some(event) = receiver.recv().await {
        let Some(text) = format_event_message(&event, &config) else {
            continue;
        };
        if let Err(e) = bot
            .send_message(chat_id, &text)
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            error!(
                error = %e,
                watch_id = %event.watch_id(),
                kind = %event.kind(),
                "Failed to send Telegram message"
            );
        }
    }

    warn!("Telegram notifier worker shutting down");
}
