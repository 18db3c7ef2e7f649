//! Retailer-native offer API extraction.
//!
//! The retailer's own store pages call a REST offer API during load; those
//! responses are intercepted and parsed here. Unlike the publication formats
//! this schema is stable enough to deserialize into typed structs.

use serde::Deserialize;
use serde_json::Value;

use crate::offers::formats::{amount_text, offer_array};
use crate::offers::OfferRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorOffer {
    content: VendorContent,
    price_information: Option<VendorPrice>,
    image: Option<VendorImage>,
}

#[derive(Debug, Deserialize)]
struct VendorContent {
    title: Option<String>,
    brand: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorPrice {
    discount_value: Option<Value>,
    minimum_amount: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct VendorImage {
    url: Option<String>,
}

/// Extract offer records from a captured vendor API payload.
///
/// The offer list may sit at the payload root or under a conventional
/// wrapper key; elements that do not match the vendor schema are dropped
/// individually.
pub(in crate::offers) fn extract_vendor_offers(body: &Value, store: &str) -> Vec<OfferRecord> {
    let Some(items) = offer_array(body) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| serde_json::from_value::<VendorOffer>(item.clone()).ok())
        .filter_map(|offer| parse_vendor_offer(&offer, store))
        .collect()
}

fn parse_vendor_offer(offer: &VendorOffer, store: &str) -> Option<OfferRecord> {
    let title = offer
        .content
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    // Brand goes in parentheses unless the title already names it.
    let name = match offer.content.brand.as_deref().map(str::trim).filter(|brand| {
        !brand.is_empty() && !title.to_lowercase().contains(&brand.to_lowercase())
    }) {
        Some(brand) => format!("{title} ({brand})"),
        None => title.to_string(),
    };

    let mut record = OfferRecord::new(store, &name);

    record.price = offer.price_information.as_ref().and_then(|pricing| {
        let amount = pricing.discount_value.as_ref().and_then(amount_text)?;
        Some(match pricing.minimum_amount {
            Some(min) if min > 1 => format!("{min} för {amount}:-"),
            _ => format!("{amount}:-"),
        })
    });

    record.description = offer
        .content
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    record.image = offer
        .image
        .as_ref()
        .and_then(|image| image.url.as_deref())
        .map(ensure_https);

    Some(record)
}

/// Rewrite protocol-relative URLs (`//host/...`) to explicit HTTPS.
fn ensure_https(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn multi_buy_price_uses_minimum_amount() {
        let body = json!({"offers": [{
            "content": {"title": "Kaffe Mellanrost"},
            "priceInformation": {"discountValue": 20, "minimumAmount": 3},
        }]});

        let offers = extract_vendor_offers(&body, "Coop Fruängen");
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price.as_deref(), Some("3 för 20:-"));
    }

    #[test]
    fn single_unit_price_has_no_quantity_prefix() {
        let body = json!({"offers": [{
            "content": {"title": "Smör"},
            "priceInformation": {"discountValue": 49, "minimumAmount": 1},
        }]});

        let offers = extract_vendor_offers(&body, "Coop");
        assert_eq!(offers[0].price.as_deref(), Some("49:-"));
    }

    #[test]
    fn brand_appended_when_not_in_title() {
        let body = json!({"offers": [{
            "content": {"title": "Mellanmjölk 1,5%", "brand": "Arla"},
        }]});

        let offers = extract_vendor_offers(&body, "Coop");
        assert_eq!(offers[0].name, "Mellanmjölk 1,5% (Arla)");
        assert!(offers[0].price.is_none(), "no pricing observed, none invented");
    }

    #[test]
    fn brand_omitted_when_already_in_title() {
        let body = json!({"offers": [{
            "content": {"title": "ARLA Mellanmjölk", "brand": "Arla"},
        }]});

        let offers = extract_vendor_offers(&body, "Coop");
        assert_eq!(offers[0].name, "ARLA Mellanmjölk");
    }

    #[test]
    fn protocol_relative_image_rewritten_to_https() {
        let body = json!({"offers": [{
            "content": {"title": "Juice"},
            "image": {"url": "//res.cloudinary.example/items/juice.png"},
        }]});

        let offers = extract_vendor_offers(&body, "Coop");
        assert_eq!(
            offers[0].image.as_deref(),
            Some("https://res.cloudinary.example/items/juice.png")
        );
    }

    #[test]
    fn absolute_image_url_kept_as_is() {
        assert_eq!(ensure_https("https://x/y.png"), "https://x/y.png");
        assert_eq!(ensure_https("//x/y.png"), "https://x/y.png");
    }

    #[test]
    fn offers_at_payload_root_are_found() {
        let body = json!([{
            "content": {"title": "Te"},
            "priceInformation": {"discountValue": 15},
        }]);

        let offers = extract_vendor_offers(&body, "Coop");
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price.as_deref(), Some("15:-"));
    }

    #[test]
    fn missing_title_and_malformed_entries_are_dropped() {
        let body = json!({"offers": [
            {"content": {"title": "  "}},
            {"content": {"brand": "Arla"}},
            {"somethingElse": true},
            {"content": {"title": "Ost"}},
        ]});

        let offers = extract_vendor_offers(&body, "Coop");
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].name, "Ost");
    }
}
