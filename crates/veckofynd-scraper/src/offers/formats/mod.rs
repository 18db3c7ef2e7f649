//! Format-specific adapters from raw provider payloads to offer records.
//!
//! Each storefront exposes a different encoding of the same concept — a
//! role-labeled layout tree, a flat hotspot list, a retailer REST schema, or
//! plain rendered text. One module per encoding; all of them are pure
//! payload-to-records functions so they can be tested without a browser.

mod dom_text;
mod hotspot;
mod incito;
mod publication;
mod vendor;

pub(super) use dom_text::extract_text_offers;
pub(super) use hotspot::extract_hotspot_offers;
pub(super) use incito::extract_incito_offers;
pub(super) use publication::{fetch_publication_offers, resolve_publication_id};
pub(super) use vendor::extract_vendor_offers;

use serde_json::Value;

/// Render a JSON amount (number or string) the way the source wrote it.
///
/// Numbers keep their JSON representation — `20` stays `"20"`, `15.9` stays
/// `"15.9"` — so price strings never gain or lose decimals in translation.
pub(crate) fn amount_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Render a JSON identifier (string or number) as a map key.
pub(crate) fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Locate the offer list in a payload: either the payload root or one of the
/// conventional wrapper keys.
pub(crate) fn offer_array(body: &Value) -> Option<&Vec<Value>> {
    if let Some(items) = body.as_array() {
        return Some(items);
    }
    for key in ["offers", "items", "data"] {
        if let Some(items) = body.get(key).and_then(Value::as_array) {
            return Some(items);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amount_text_keeps_number_representation() {
        assert_eq!(amount_text(&json!(20)).as_deref(), Some("20"));
        assert_eq!(amount_text(&json!(15.9)).as_deref(), Some("15.9"));
        assert_eq!(amount_text(&json!("15.90")).as_deref(), Some("15.90"));
    }

    #[test]
    fn amount_text_rejects_blank_and_non_scalar() {
        assert_eq!(amount_text(&json!("")), None);
        assert_eq!(amount_text(&json!("   ")), None);
        assert_eq!(amount_text(&json!(null)), None);
        assert_eq!(amount_text(&json!({"value": 20})), None);
    }

    #[test]
    fn id_text_accepts_strings_and_numbers() {
        assert_eq!(id_text(&json!("a8Xzy3")).as_deref(), Some("a8Xzy3"));
        assert_eq!(id_text(&json!(42)).as_deref(), Some("42"));
        assert_eq!(id_text(&json!("")), None);
        assert_eq!(id_text(&json!(["x"])), None);
    }

    #[test]
    fn offer_array_finds_root_and_wrapped_lists() {
        let root = json!([{"a": 1}]);
        assert_eq!(offer_array(&root).map(Vec::len), Some(1));

        let wrapped = json!({"offers": [{"a": 1}, {"b": 2}]});
        assert_eq!(offer_array(&wrapped).map(Vec::len), Some(2));

        let none = json!({"meta": {"count": 0}});
        assert!(offer_array(&none).is_none());
    }
}
