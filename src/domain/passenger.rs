//! Passenger manifest.
//!
//! The engine only looks at passenger categories (for counts sent with a
//! price check). Everything else about a passenger is an opaque payload that
//! is forwarded verbatim to the reservation service.

use serde::{Deserialize, Serialize};

/// Fare category of a passenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerCategory {
    Adult,
    Child,
    Infant,
}

/// A single traveller on the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub category: PassengerCategory,
    /// Name, document and contact fields, formatted by the provider-side collaborator.
    #[serde(default)]
    pub details: serde_json::Value,
}

impl Passenger {
    #[must_use]
    pub fn new(category: PassengerCategory, details: serde_json::Value) -> Self {
        Self { category, details }
    }
}

/// Passenger counts by category, as sent with a price check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassengerCounts {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl PassengerCounts {
    /// Total seats priced; infants travel on a lap and are included.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }
}

/// Ordered passenger list attached to a watch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Vec<Passenger>);

impl Manifest {
    #[must_use]
    pub fn new(passengers: Vec<Passenger>) -> Self {
        Self(passengers)
    }

    #[must_use]
    pub fn passengers(&self) -> &[Passenger] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Count passengers per category.
    #[must_use]
    pub fn counts(&self) -> PassengerCounts {
        self.0
            .iter()
            .fold(PassengerCounts::default(), |mut counts, passenger| {
                match passenger.category {
                    PassengerCategory::Adult => counts.adults += 1,
                    PassengerCategory::Child => counts.children += 1,
                    PassengerCategory::Infant => counts.infants += 1,
                }
                counts
            })
    }

    /// Counts used for pricing. An empty manifest is priced as one adult.
    #[must_use]
    pub fn pricing_counts(&self) -> PassengerCounts {
        if self.is_empty() {
            PassengerCounts {
                adults: 1,
                ..PassengerCounts::default()
            }
        } else {
            self.counts()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_by_category() {
        let manifest = Manifest::new(vec![
            Passenger::new(PassengerCategory::Adult, json!({"name": "A"})),
            Passenger::new(PassengerCategory::Adult, json!({"name": "B"})),
            Passenger::new(PassengerCategory::Child, json!({"name": "C"})),
            Passenger::new(PassengerCategory::Infant, json!({"name": "D"})),
        ]);

        let counts = manifest.counts();
        assert_eq!(counts.adults, 2);
        assert_eq!(counts.children, 1);
        assert_eq!(counts.infants, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn empty_manifest_prices_one_adult() {
        let counts = Manifest::default().pricing_counts();
        assert_eq!(counts.adults, 1);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn manifest_is_a_plain_json_array() {
        let manifest: Manifest =
            serde_json::from_str(r#"[{"category":"adult","details":{"name":"A"}}]"#).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.passengers()[0].category, PassengerCategory::Adult);
    }
}
