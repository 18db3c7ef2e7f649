//! Role-labeled layout-tree extraction.
//!
//! The flyer renderer fetches an "incito" document: an arbitrarily nested
//! layout tree in which offer cells are marked with `"role": "offer"`. The
//! adapter walks the tree, gathers each offer cell's text leaves in document
//! order, and parses that text list into a record. Image URLs are pulled from
//! the same subtree in a second search; only URLs served through the image
//! transformer count — everything else is a placeholder or loader asset.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::offers::OfferRecord;

/// Recursion bound for the tree walks. Real incito documents nest ~15 deep;
/// the cap guards against cyclic or pathological structures.
const MAX_DEPTH: usize = 30;

/// Keys that conventionally hold a node's sub-structure, searched before any
/// other key so document order is approximated.
const CHILD_KEYS: [&str; 3] = ["child_views", "children", "root_view"];

/// Path marker of the provider's image CDN. Offer cells also carry loader
/// and placeholder assets; those never go through the transformer.
const IMAGE_URL_MARKER: &str = "image-transformer";

/// Fixed per-unit tokens seen in offer text.
const UNIT_TOKENS: [&str; 3] = ["/kg", "/st", "/liter"];

static PAGE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*/\s*\d+$").expect("valid regex"));
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+:-$").expect("valid regex"));
static MULTI_BUY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s+för$").expect("valid regex"));
static ORD_PRIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ord\.pris\s+([\d:,.-]+)\s*kr").expect("valid regex"));
static JFR_PRIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Jfr pris\s+([\d:,.-]+)").expect("valid regex"));

/// One offer cell found in the tree: its text leaves plus an image, if any.
struct OfferGroup {
    texts: Vec<String>,
    image: Option<String>,
}

/// Extract offer records from an incito layout tree.
pub(in crate::offers) fn extract_incito_offers(body: &Value, store: &str) -> Vec<OfferRecord> {
    find_offer_groups(body, 0)
        .into_iter()
        .filter_map(|group| {
            parse_offer_texts(&group.texts, store).map(|mut record| {
                record.image = group.image;
                record
            })
        })
        .collect()
}

/// Depth-bounded search for `role == "offer"` nodes.
///
/// An offer node terminates the descent: its subtree is consumed for texts
/// and image instead of being searched for further offers. Note the image
/// search may re-visit structure the text collection already walked; the two
/// passes are kept independent on purpose.
fn find_offer_groups(value: &Value, depth: usize) -> Vec<OfferGroup> {
    if depth > MAX_DEPTH {
        return Vec::new();
    }

    let mut groups = Vec::new();
    match value {
        Value::Object(map) => {
            if map.get("role").and_then(Value::as_str) == Some("offer") {
                let texts = collect_texts(value);
                if !texts.is_empty() {
                    groups.push(OfferGroup {
                        image: find_offer_image(value, 0),
                        texts,
                    });
                }
            } else {
                for key in CHILD_KEYS {
                    if let Some(child) = map.get(key) {
                        groups.extend(find_offer_groups(child, depth + 1));
                    }
                }
                for (key, child) in map {
                    if CHILD_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    if child.is_object() || child.is_array() {
                        groups.extend(find_offer_groups(child, depth + 1));
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                groups.extend(find_offer_groups(item, depth + 1));
            }
        }
        _ => {}
    }

    groups
}

/// Gather every string-valued `"text"` leaf beneath a node, in document order.
fn collect_texts(value: &Value) -> Vec<String> {
    let mut texts = Vec::new();
    match value {
        Value::Object(map) => {
            if let Some(text) = map.get("text").and_then(Value::as_str) {
                texts.push(text.to_string());
            }
            for child in map.values() {
                texts.extend(collect_texts(child));
            }
        }
        Value::Array(items) => {
            for item in items {
                texts.extend(collect_texts(item));
            }
        }
        _ => {}
    }
    texts
}

/// First descendant string that is an image-transformer URL.
///
/// Sub-structure under the conventional child keys is preferred before other
/// keys, so the cell's own artwork wins over decorations attached elsewhere
/// in the node.
fn find_offer_image(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_DEPTH {
        return None;
    }

    match value {
        Value::String(s) => {
            (s.starts_with("http") && s.contains(IMAGE_URL_MARKER)).then(|| s.clone())
        }
        Value::Object(map) => {
            for key in CHILD_KEYS {
                if let Some(found) = map.get(key).and_then(|c| find_offer_image(c, depth + 1)) {
                    return Some(found);
                }
            }
            for (key, child) in map {
                if CHILD_KEYS.contains(&key.as_str()) {
                    continue;
                }
                if let Some(found) = find_offer_image(child, depth + 1) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(|item| find_offer_image(item, depth + 1)),
        _ => None,
    }
}

/// Parse an offer cell's ordered text list into a record.
///
/// The first text is the candidate name, unless it is a bare `"N / M"` page
/// marker — then the second text is used. Remaining texts are classified as
/// price, unit, or description; reference and comparison prices are lifted
/// out of the description texts by capture group.
fn parse_offer_texts(texts: &[String], store: &str) -> Option<OfferRecord> {
    let first = texts.first()?;
    let name = if PAGE_MARKER_RE.is_match(first) {
        texts.get(1)?
    } else {
        first
    };
    let name = name.trim();
    if name.chars().count() < 2 {
        return None;
    }

    let mut record = OfferRecord::new(store, name);
    let mut description_parts: Vec<String> = Vec::new();

    for text in texts.iter().skip(1) {
        if PRICE_RE.is_match(text) {
            record.price = Some(text.clone());
        } else if UNIT_TOKENS.contains(&text.as_str()) || MULTI_BUY_RE.is_match(text) {
            record.unit = Some(text.clone());
        } else if text.contains('|') || text.contains("Ord.pris") || text.contains("Jfr pris") {
            description_parts.push(text.clone());
            if let Some(cap) = ORD_PRIS_RE.captures(text) {
                record.ord_pris = Some(cap[1].to_string());
            }
            if let Some(cap) = JFR_PRIS_RE.captures(text) {
                record.jfr_pris = Some(cap[1].to_string());
            }
        }
    }

    if !description_parts.is_empty() {
        record.description = Some(description_parts.join(" | "));
    }

    Some(record)
}
