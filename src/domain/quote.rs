//! Canonical price-check results.
//!
//! Provider adapters normalize their responses into [`FareOption`]s and then
//! into a single [`PriceQuote`]; nothing downstream sees provider field names.

use chrono::NaiveTime;

use super::id::BookableRef;

/// One leg of a fare option as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedLeg {
    pub departure_time: Option<NaiveTime>,
    pub fare_class: Option<String>,
    pub bookable_ref: Option<BookableRef>,
}

/// A priced itinerary option, legs in itinerary order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareOption {
    /// Total price for all passengers and legs of this option.
    pub price: i64,
    pub legs: Vec<QuotedLeg>,
}

/// Normalized result of one price check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: i64,
    /// Whether an itinerary satisfying every watch constraint was found.
    pub matched: bool,
    /// Bookable reference per leg; all `None` when `matched` is false.
    pub bookable_refs: Vec<Option<BookableRef>>,
}

impl PriceQuote {
    /// Quote for an option that satisfies the watch.
    #[must_use]
    pub fn matched(price: i64, bookable_refs: Vec<Option<BookableRef>>) -> Self {
        Self {
            price,
            matched: true,
            bookable_refs,
        }
    }

    /// Quote carrying only an observed price; nothing matched the constraints.
    #[must_use]
    pub fn unmatched(price: i64, legs: usize) -> Self {
        Self {
            price,
            matched: false,
            bookable_refs: vec![None; legs],
        }
    }

    /// Every leg's reference, when all `legs` legs carry a non-blank one.
    #[must_use]
    pub fn usable_refs(&self, legs: usize) -> Option<Vec<BookableRef>> {
        if !self.matched || self.bookable_refs.len() != legs {
            return None;
        }
        self.bookable_refs
            .iter()
            .map(|r| r.as_ref().filter(|r| !r.is_blank()).cloned())
            .collect()
    }

    /// Merge per-leg quotes into one itinerary quote.
    ///
    /// Prices add up; the result only matches when every leg matched.
    /// `None` when the total does not fit in an `i64`.
    #[must_use]
    pub fn combine(quotes: Vec<PriceQuote>) -> Option<Self> {
        let matched = !quotes.is_empty() && quotes.iter().all(|q| q.matched);
        let price = quotes
            .iter()
            .try_fold(0i64, |total, q| total.checked_add(q.price))?;
        let legs: usize = quotes.iter().map(|q| q.bookable_refs.len()).sum();
        if !matched {
            return Some(Self::unmatched(price, legs));
        }
        Some(Self {
            price,
            matched,
            bookable_refs: quotes.into_iter().flat_map(|q| q.bookable_refs).collect(),
        })
    }
}
