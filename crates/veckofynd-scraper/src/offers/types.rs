//! Canonical offer record produced by every extraction tier.

use serde::{Deserialize, Serialize};

/// A single promotional price listing for one product at one storefront.
///
/// `store` and `name` are always populated; everything else is optional and
/// only ever carries what the source actually exposed — adapters never
/// synthesize values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub store: String,
    /// Product name, trimmed.
    pub name: String,
    /// Free-text price; may encode currency and multi-buy phrasing
    /// (`"59:-"`, `"3 för 20:-"`, `"Medlemspris"`).
    pub price: Option<String>,
    /// Free-text unit (`"/kg"`, `"2 för"`).
    pub unit: Option<String>,
    pub description: Option<String>,
    /// Pre-discount reference price, as displayed.
    pub ord_pris: Option<String>,
    /// Per-unit comparison price, as displayed.
    pub jfr_pris: Option<String>,
    /// Absolute product image URL.
    pub image: Option<String>,
}

impl OfferRecord {
    /// A record with only the mandatory fields set.
    #[must_use]
    pub fn new(store: &str, name: &str) -> Self {
        Self {
            store: store.to_string(),
            name: name.trim().to_string(),
            price: None,
            unit: None,
            description: None,
            ord_pris: None,
            jfr_pris: None,
            image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_name() {
        let record = OfferRecord::new("Willys", "  Mjölk 3 liter ");
        assert_eq!(record.name, "Mjölk 3 liter");
        assert_eq!(record.store, "Willys");
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let record = OfferRecord::new("Coop", "Kaffe");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Kaffe");
        assert!(json["price"].is_null());
        assert!(json["image"].is_null());
    }
}
