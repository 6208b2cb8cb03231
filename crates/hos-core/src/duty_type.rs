//! On-duty sub-activity classification from free-text notes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What an on-duty period was spent on, as far as the note tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DutyType {
    /// Pre-trip inspection.
    Pti,
    Delivery,
    Pickup,
    /// Time at a shipper or receiver dock.
    Loading,
    Fuel,
    Unknown,
}

/// Keyword table in priority order. The first category with a keyword
/// contained in the note wins, so `loading` resolves to [`DutyType::Pickup`].
const KEYWORDS: &[(DutyType, &[&str])] = &[
    (DutyType::Pti, &["pti", "pre-trip", "pretrip", "pre trip"]),
    (DutyType::Delivery, &["delivery", "unload", "receiving"]),
    (DutyType::Pickup, &["pickup", "pick up", "loading"]),
    (DutyType::Loading, &["shipper", "receiver", "at dock"]),
    (DutyType::Fuel, &["fuel"]),
];

impl DutyType {
    /// Classifies a note by case-insensitive keyword match.
    pub fn classify(note: &str) -> Self {
        if note.trim().is_empty() {
            return Self::Unknown;
        }

        let note = note.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| note.contains(keyword)))
            .map_or(Self::Unknown, |(duty_type, _)| *duty_type)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pti => "pti",
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
            Self::Loading => "loading",
            Self::Fuel => "fuel",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the activity is freight handling subject to the loading minimum.
    #[must_use]
    pub const fn is_freight_handling(&self) -> bool {
        matches!(self, Self::Delivery | Self::Pickup | Self::Loading)
    }
}

impl fmt::Display for DutyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_each_category() {
        assert_eq!(DutyType::classify("PTI"), DutyType::Pti);
        assert_eq!(DutyType::classify("Pre-Trip inspection"), DutyType::Pti);
        assert_eq!(DutyType::classify("pre trip"), DutyType::Pti);
        assert_eq!(DutyType::classify("Delivery at Walmart DC"), DutyType::Delivery);
        assert_eq!(DutyType::classify("unloading"), DutyType::Delivery);
        assert_eq!(DutyType::classify("Pick up load 55"), DutyType::Pickup);
        assert_eq!(DutyType::classify("waiting at dock 4"), DutyType::Loading);
        assert_eq!(DutyType::classify("checked in with shipper"), DutyType::Loading);
        assert_eq!(DutyType::classify("Fuel stop"), DutyType::Fuel);
    }

    #[test]
    fn test_empty_or_unmatched_note_is_unknown() {
        assert_eq!(DutyType::classify(""), DutyType::Unknown);
        assert_eq!(DutyType::classify("   "), DutyType::Unknown);
        assert_eq!(DutyType::classify("break"), DutyType::Unknown);
    }

    #[test]
    fn test_earlier_category_wins_on_overlap() {
        assert_eq!(DutyType::classify("pretrip then fuel"), DutyType::Pti);
        assert_eq!(DutyType::classify("fuel then pretrip"), DutyType::Pti);
        // "loading" is a pickup keyword, checked before the dock keywords
        assert_eq!(DutyType::classify("loading at dock"), DutyType::Pickup);
        // "unloading" contains both "unload" and "loading"
        assert_eq!(DutyType::classify("unloading"), DutyType::Delivery);
    }

    #[test]
    fn test_freight_handling_types() {
        assert!(DutyType::Delivery.is_freight_handling());
        assert!(DutyType::Pickup.is_freight_handling());
        assert!(DutyType::Loading.is_freight_handling());
        assert!(!DutyType::Pti.is_freight_handling());
        assert!(!DutyType::Fuel.is_freight_handling());
        assert!(!DutyType::Unknown.is_freight_handling());
    }
}
