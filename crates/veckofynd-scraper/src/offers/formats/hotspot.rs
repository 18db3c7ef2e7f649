//! Paged-publication hotspot extraction.
//!
//! Some chains publish their flyer as a paged publication: a flat list of
//! "hotspot" objects, each wrapping one offer with heading, pricing and
//! quantity fields. The image field is notoriously inconsistent across
//! publications — a bare URL string, a list of strings, a list of objects,
//! or a single object — so it is modeled as one tagged union with a single
//! normalization function instead of type checks scattered through the
//! adapter.

use serde::Deserialize;
use serde_json::Value;

use crate::offers::images::OfferImageMap;
use crate::offers::formats::{amount_text, id_text};
use crate::offers::OfferRecord;

#[derive(Debug, Deserialize)]
pub(super) struct HotspotOffer {
    id: Option<Value>,
    heading: Option<String>,
    #[serde(default)]
    pricing: Pricing,
    #[serde(default)]
    quantity: Quantity,
    image: Option<ImageField>,
}

#[derive(Debug, Default, Deserialize)]
struct Pricing {
    price: Option<Value>,
    pre_price: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Quantity {
    #[serde(default)]
    unit: Unit,
}

#[derive(Debug, Default, Deserialize)]
struct Unit {
    symbol: Option<String>,
}

/// The four shapes the image field arrives in.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ImageField {
    Url(String),
    Many(Vec<ImageEntry>),
    One(ImageObject),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ImageEntry {
    Url(String),
    Object(ImageObject),
}

#[derive(Debug, Clone, Deserialize)]
struct ImageObject {
    url: Option<String>,
    src: Option<String>,
}

impl ImageField {
    /// Collapse any of the four shapes to a single URL: a bare string first,
    /// else the first list element's string or URL field, else the object's
    /// URL field.
    fn resolve(&self) -> Option<String> {
        match self {
            ImageField::Url(url) => Some(url.clone()),
            ImageField::Many(entries) => entries.first().and_then(|entry| match entry {
                ImageEntry::Url(url) => Some(url.clone()),
                ImageEntry::Object(object) => object.resolve(),
            }),
            ImageField::One(object) => object.resolve(),
        }
    }
}

impl ImageObject {
    fn resolve(&self) -> Option<String> {
        self.url.clone().or_else(|| self.src.clone())
    }
}

/// Extract offer records from a paged-publication hotspot payload.
///
/// Hotspots without a heading are skipped, and a hotspot whose offer does
/// not match the expected shape drops that candidate alone, not the payload.
/// When an `images` map is supplied, offers whose own image field resolved to
/// nothing are back-filled by offer id from the inventory pass.
pub(in crate::offers) fn extract_hotspot_offers(
    body: &Value,
    store: &str,
    images: Option<&OfferImageMap>,
) -> Vec<OfferRecord> {
    let Some(hotspots) = body.get("hotspots").and_then(Value::as_array) else {
        return Vec::new();
    };

    hotspots
        .iter()
        .filter_map(|hotspot| hotspot.get("offer"))
        .filter_map(|offer| serde_json::from_value::<HotspotOffer>(offer.clone()).ok())
        .filter_map(|offer| parse_hotspot_offer(&offer, store, images))
        .collect()
}

/// Parse one publication offer object; shared with the catalog page walk,
/// which serves the same offer shape outside a hotspot wrapper.
pub(super) fn parse_single_offer(
    value: &Value,
    store: &str,
    images: Option<&OfferImageMap>,
) -> Option<(Option<String>, OfferRecord)> {
    let offer = serde_json::from_value::<HotspotOffer>(value.clone()).ok()?;
    let id = offer.id.as_ref().and_then(id_text);
    let record = parse_hotspot_offer(&offer, store, images)?;
    Some((id, record))
}

fn parse_hotspot_offer(
    offer: &HotspotOffer,
    store: &str,
    images: Option<&OfferImageMap>,
) -> Option<OfferRecord> {
    let heading = offer.heading.as_deref().map(str::trim).filter(|h| !h.is_empty())?;

    let mut record = OfferRecord::new(store, heading);

    record.price = offer
        .pricing
        .price
        .as_ref()
        .and_then(amount_text)
        .map(|amount| format!("{amount}:-"));

    record.description = offer
        .pricing
        .pre_price
        .as_ref()
        .and_then(amount_text)
        .map(|amount| format!("Ord.pris {amount}:-"));

    record.unit = offer
        .quantity
        .unit
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    record.image = offer.image.as_ref().and_then(ImageField::resolve);
    if record.image.is_none() {
        if let (Some(map), Some(id)) = (images, offer.id.as_ref().and_then(id_text)) {
            record.image = map.get(&id).cloned();
        }
    }

    Some(record)
}
