//! Price comparison and persistence policy.
//!
//! Pure decision logic: given the stored price and a fresh quote, decide
//! whether to write the price back, which price-change event applies, and
//! whether the watch qualifies for an automatic hold.

use super::id::BookableRef;
use super::quote::PriceQuote;
use super::watch::Watch;

/// How a provider's quotes may overwrite the stored price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistencePolicy {
    /// Every quote is ground truth and is always stored.
    Authoritative,
    /// Quotes are compared but only stored on the very first observation.
    Advisory,
}

impl PersistencePolicy {
    /// Whether a quote should be written given the stored price.
    #[must_use]
    pub const fn should_persist(self, previous: Option<i64>) -> bool {
        match self {
            Self::Authoritative => true,
            Self::Advisory => previous.is_none(),
        }
    }
}

/// Outcome of comparing a new price with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Nothing was stored yet; the quote primes the baseline.
    FirstObservation { price: i64 },
    Decreased { previous: i64, current: i64 },
    Increased { previous: i64, current: i64 },
    Unchanged { price: i64 },
}

impl Classification {
    /// Compare a stored price with a new one.
    #[must_use]
    pub fn of(previous: Option<i64>, current: i64) -> Self {
        match previous {
            None => Self::FirstObservation { price: current },
            Some(previous) if current < previous => Self::Decreased { previous, current },
            Some(previous) if current > previous => Self::Increased { previous, current },
            Some(_) => Self::Unchanged { price: current },
        }
    }

    #[must_use]
    pub const fn is_decrease(&self) -> bool {
        matches!(self, Self::Decreased { .. })
    }

    /// Stable label for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FirstObservation { .. } => "first_observation",
            Self::Decreased { .. } => "decreased",
            Self::Increased { .. } => "increased",
            Self::Unchanged { .. } => "unchanged",
        }
    }
}

/// Everything the check cycle needs to act on a matched quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDecision {
    pub classification: Classification,
    /// Write the quote's price and references to the watch.
    pub persist: bool,
    /// References to reserve with, present only when the drop qualifies for auto-hold.
    pub hold_refs: Option<Vec<BookableRef>>,
}

impl PriceDecision {
    #[must_use]
    pub fn qualifies_for_hold(&self) -> bool {
        self.hold_refs.is_some()
    }
}

/// Decide what to do with `quote` for `watch`.
///
/// Returns `None` for unmatched quotes: no comparison takes place.
#[must_use]
pub fn evaluate(watch: &Watch, quote: &PriceQuote) -> Option<PriceDecision> {
    if !quote.matched {
        return None;
    }

    let classification = Classification::of(watch.current_price, quote.price);
    let persist = watch
        .provider()
        .persistence()
        .should_persist(watch.current_price);

    let hold_refs = if classification.is_decrease() && watch.auto_hold && !watch.manifest.is_empty()
    {
        quote.usable_refs(watch.itinerary.legs.len())
    } else {
        None
    };

    Some(PriceDecision {
        classification,
        persist,
        hold_refs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::itinerary::{Itinerary, Leg, Provider};
    use crate::domain::passenger::{Manifest, Passenger, PassengerCategory};
    use chrono::NaiveDate;

    fn watch(provider: Provider) -> Watch {
        Watch::new(
            "owner",
            Itinerary::one_way(
                provider,
                Leg::new("HAN", "SGN", NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()),
            ),
            600,
        )
    }

    fn manifest() -> Manifest {
        Manifest::new(vec![Passenger::new(
            PassengerCategory::Adult,
            serde_json::json!({"name": "NGUYEN VAN A"}),
        )])
    }

    fn quote(price: i64) -> PriceQuote {
        PriceQuote::matched(price, vec![Some(BookableRef::new("fk"))])
    }

    #[test]
    fn classification_covers_all_cases() {
        assert_eq!(
            Classification::of(None, 100),
            Classification::FirstObservation { price: 100 }
        );
        assert_eq!(
            Classification::of(Some(100), 90),
            Classification::Decreased {
                previous: 100,
                current: 90
            }
        );
        assert_eq!(
            Classification::of(Some(100), 110),
            Classification::Increased {
                previous: 100,
                current: 110
            }
        );
        assert_eq!(
            Classification::of(Some(100), 100),
            Classification::Unchanged { price: 100 }
        );
    }

    #[test]
    fn unmatched_quote_is_not_compared() {
        let w = watch(Provider::Alpha).with_price(100);
        assert!(evaluate(&w, &PriceQuote::unmatched(50, 1)).is_none());
    }

    #[test]
    fn authoritative_quotes_always_persist() {
        let w = watch(Provider::Alpha).with_price(100);
        let decision = evaluate(&w, &quote(120)).unwrap();
        assert!(decision.persist);
    }

    #[test]
    fn advisory_quotes_persist_only_first_observation() {
        let w = watch(Provider::Beta);
        assert!(evaluate(&w, &quote(120)).unwrap().persist);

        let w = w.with_price(100);
        let decision = evaluate(&w, &quote(90)).unwrap();
        assert!(decision.classification.is_decrease());
        assert!(!decision.persist);
    }

    #[test]
    fn drop_qualifies_only_with_auto_hold_manifest_and_refs() {
        let base = watch(Provider::Alpha).with_price(100);

        let decision = evaluate(&base, &quote(90)).unwrap();
        assert!(!decision.qualifies_for_hold(), "auto-hold disabled");

        let enabled = base.clone().with_auto_hold(true);
        let decision = evaluate(&enabled, &quote(90)).unwrap();
        assert!(!decision.qualifies_for_hold(), "empty manifest");

        let ready = enabled.with_manifest(manifest());
        let decision = evaluate(&ready, &quote(90)).unwrap();
        assert_eq!(decision.hold_refs, Some(vec![BookableRef::new("fk")]));

        let no_ref = PriceQuote::matched(90, vec![None]);
        assert!(!evaluate(&ready, &no_ref).unwrap().qualifies_for_hold());
    }

    #[test]
    fn equal_price_never_qualifies() {
        let w = watch(Provider::Alpha)
            .with_price(100)
            .with_auto_hold(true)
            .with_manifest(manifest());
        let decision = evaluate(&w, &quote(100)).unwrap();
        assert_eq!(decision.classification, Classification::Unchanged { price: 100 });
        assert!(!decision.qualifies_for_hold());
    }
}
