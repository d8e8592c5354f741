//! Telegram chat notifications.
//!
//! Price changes, failures and hold outcomes are delivered as MarkdownV2
//! messages to a single chat.

mod format;

pub mod notifier;
