//! Message formatting for Telegram notifications.

use crate::domain::Trigger;
use crate::port::outbound::notifier::{Event, PriceEvent, WatchSubject};

use super::notifier::TelegramConfig;

/// Format an event into a Telegram message, or None if the event should be skipped.
pub fn format_event_message(event: &Event, config: &TelegramConfig) -> Option<String> {
    match event {
        Event::PriceDecreased(e) if config.notify_price_changes => {
            Some(price_message("📉", "Price Dropped", e))
        }
        Event::PriceIncreased(e) if config.notify_price_changes => {
            Some(price_message("📈", "Price Increased", e))
        }
        Event::PriceUnchanged(e) if config.notify_price_changes => {
            Some(price_message("➖", "Price Unchanged", e))
        }
        Event::CheckFailed(e) if config.notify_failures => Some(format!(
            "⚠️ *Check Failed*\n\
            \n\
            {}\n\
            🚫 Reason: {}{}",
            header(&e.subject),
            escape_markdown(&truncate(&e.reason, 200)),
            trigger_note(e.trigger)
        )),
        Event::HoldSucceeded(e) if config.notify_holds => {
            let mut msg = format!(
                "✅ *Hold Placed*\n\
                \n\
                {}\n\
                🎫 Code: `{}`\n\
                💰 Price: `{}`",
                header(&e.subject),
                escape_markdown(e.code.as_str()),
                format_price(e.price)
            );
            if let Some(expires_at) = e.expires_at {
                msg.push_str(&format!(
                    "\n⏳ Expires: `{}`",
                    escape_markdown(&expires_at.format("%Y-%m-%d %H:%M UTC").to_string())
                ));
            }
            if let Some(prior) = &e.superseded {
                msg.push_str(&format!(
                    "\n♻️ Replaces: `{}`",
                    escape_markdown(prior.as_str())
                ));
            }
            Some(msg)
        }
        Event::HoldFailed(e) if config.notify_holds => Some(format!(
            "❌ *Hold Failed*\n\
            \n\
            {}\n\
            🚫 Reason: {}",
            header(&e.subject),
            escape_markdown(&truncate(&e.reason, 200))
        )),
        Event::HoldSkippedAlreadyIssued(e) if config.notify_holds => {
            let prior = e.prior.as_ref().map_or_else(
                || "the prior reservation".to_string(),
                |code| format!("`{}`", escape_markdown(code.as_str())),
            );
            Some(format!(
                "🎟️ *Already Issued*\n\
                \n\
                {}\n\
                ℹ️ {} is already ticketed, watch removed",
                header(&e.subject),
                prior
            ))
        }
        _ => None,
    }
}

fn price_message(emoji: &str, title: &str, e: &PriceEvent) -> String {
    format!(
        "{} *{}*\n\
        \n\
        {}\n\
        💵 `{}` → `{}`{}",
        emoji,
        title,
        header(&e.subject),
        format_price(e.previous),
        format_price(e.current),
        trigger_note(e.trigger)
    )
}

fn header(subject: &WatchSubject) -> String {
    format!(
        "✈️ {}\n🆔 `{}`",
        escape_markdown(&truncate(&subject.itinerary, 80)),
        escape_markdown(subject.watch_id.as_str())
    )
}

fn trigger_note(trigger: Trigger) -> &'static str {
    match trigger {
        Trigger::Manual => "\n👆 _manual check_",
        Trigger::Automatic => "",
    }
}

/// Group digits in threes: `1290000` → `1,290,000`.
pub fn format_price(price: i64) -> String {
    let digits = price.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if price < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Truncate a string with ellipsis (Unicode-safe).
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// Escape special characters for Telegram `MarkdownV2`.
pub fn escape_markdown(text: &str) -> String {
    let special_chars = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        if special_chars.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OwnerId, ReservationCode, WatchId};
    use crate::port::outbound::notifier::{FailureEvent, HoldEvent};

    fn config() -> TelegramConfig {
        TelegramConfig {
            bot_token: "token".into(),
            chat_id: 1,
            notify_price_changes: true,
            notify_holds: true,
            notify_failures: false,
        }
    }

    fn subject() -> WatchSubject {
        WatchSubject {
            watch_id: WatchId::from("w-1"),
            owner: OwnerId::new("owner"),
            itinerary: "[alpha] HAN→SGN 2026-11-02".into(),
        }
    }

    #[test]
    fn escape_markdown_escapes_reserved() {
        assert_eq!(escape_markdown("hello"), "hello");
        assert_eq!(escape_markdown("w-1"), "w\\-1");
        assert_eq!(escape_markdown("*bold*"), "\\*bold\\*");
        assert_eq!(escape_markdown("a.b"), "a\\.b");
    }

    #[test]
    fn truncate_is_unicode_safe() {
        assert_eq!(truncate("hello world", 5), "hello...");
        assert_eq!(truncate("café", 4), "café");
        assert_eq!(truncate("日本語です", 3), "日本語...");
    }

    #[test]
    fn prices_are_grouped() {
        assert_eq!(format_price(0), "0");
        assert_eq!(format_price(999), "999");
        assert_eq!(format_price(1_290_000), "1,290,000");
        assert_eq!(format_price(-45_000), "-45,000");
    }

    #[test]
    fn price_drop_shows_both_prices() {
        let event = Event::PriceDecreased(PriceEvent {
            subject: subject(),
            previous: 1_500_000,
            current: 1_290_000,
            trigger: Trigger::Manual,
        });
        let text = format_event_message(&event, &config()).unwrap();
        assert!(text.contains("Price Dropped"));
        assert!(text.contains("`1,500,000` → `1,290,000`"));
        assert!(text.contains("manual check"));
    }

    #[test]
    fn disabled_kinds_are_skipped() {
        let event = Event::CheckFailed(FailureEvent {
            subject: subject(),
            reason: "timeout".into(),
            trigger: Trigger::Automatic,
        });
        assert!(format_event_message(&event, &config()).is_none());
    }

    #[test]
    fn hold_message_names_superseded_code() {
        let event = Event::HoldSucceeded(HoldEvent {
            subject: subject(),
            code: ReservationCode::new("NEW123"),
            price: 900,
            expires_at: None,
            superseded: Some(ReservationCode::new("OLD999")),
        });
        let text = format_event_message(&event, &config()).unwrap();
        assert!(text.contains("`NEW123`"));
        assert!(text.contains("`OLD999`"));
        assert!(!text.contains("Expires"));
    }
}
