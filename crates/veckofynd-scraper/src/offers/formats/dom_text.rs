//! Rendered-text fallback extraction.
//!
//! Last-resort tier, used only when no structured capture yields records:
//! the page's visible text is split into lines and matched against the three
//! price phrasings the flyer sites render. Low fidelity — no units, no
//! descriptions, no images — but better than losing the store entirely.

use std::sync::LazyLock;

use regex::Regex;

use crate::offers::OfferRecord;

static SEK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?),\s*SEK\s*([\d.]+)$").expect("valid regex"));
static MEMBER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?),\s*Medlemspris$").expect("valid regex"));
static TRAILING_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+(\d+)[:\-]+\s*$").expect("valid regex"));

/// Extract offer records from a page's visible text.
pub(in crate::offers) fn extract_text_offers(body_text: &str, store: &str) -> Vec<OfferRecord> {
    body_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| parse_line(line, store))
        .collect()
}

/// Try the three line patterns in order; the first match decides the line's
/// fate even when its name is out of bounds.
fn parse_line(line: &str, store: &str) -> Option<OfferRecord> {
    if let Some(cap) = SEK_LINE_RE.captures(line) {
        return record_with_price(store, &cap[1], format!("{}:-", &cap[2]));
    }

    if let Some(cap) = MEMBER_LINE_RE.captures(line) {
        return record_with_price(store, &cap[1], "Medlemspris".to_string());
    }

    if let Some(cap) = TRAILING_PRICE_RE.captures(line) {
        return record_with_price(store, &cap[1], format!("{}:-", &cap[2]));
    }

    None
}

fn record_with_price(store: &str, name: &str, price: String) -> Option<OfferRecord> {
    let name = name.trim();
    if !name_in_bounds(name) {
        return None;
    }
    let mut record = OfferRecord::new(store, name);
    record.price = Some(price);
    Some(record)
}

/// Product names on these pages are 3..=99 characters; anything outside is a
/// header, a nav item, or line noise.
fn name_in_bounds(name: &str) -> bool {
    let len = name.chars().count();
    len > 2 && len < 100
}
