//! Inventory-view image correlation.
//!
//! The flyer viewer renders offer artwork into a canvas, so image URLs are
//! not reachable from the offer payloads of every store. The inventory view
//! of the same listing, however, is a plain grid of anchors — one per offer,
//! with the offer id in the link target and an `img` inside. This secondary
//! pass scrolls that grid and reads the pairs out.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use veckofynd_core::AppConfig;

use crate::error::ScrapeError;
use crate::session::Session;

/// Offer identifier to image URL, consumed once per store run.
pub type OfferImageMap = HashMap<String, String>;

#[derive(Debug, Deserialize)]
struct AnchorImage {
    id: String,
    src: String,
}

/// Enumerates `a[href]` elements whose link target encodes an offer id and
/// reads each nested image's effective source.
const ANCHOR_IMAGE_JS: &str = r"
(() => {
  const pairs = [];
  for (const anchor of document.querySelectorAll('a[href]')) {
    const match = anchor.href.match(/offers?[\/=]([A-Za-z0-9_-]{4,})/);
    if (!match) continue;
    const img = anchor.querySelector('img');
    if (!img) continue;
    const src = img.currentSrc || img.src;
    if (!src) continue;
    pairs.push({ id: match[1], src });
  }
  return pairs;
})()
";

/// Build the offer-id → image-URL map for a store's inventory view.
///
/// Offers with no matching anchor simply stay imageless — expected, not an
/// error.
///
/// # Errors
///
/// Returns [`ScrapeError::Evaluate`] when the anchor enumeration cannot run;
/// navigation and scroll problems degrade to warnings as everywhere else.
pub(super) async fn collect_offer_images(
    session: &Session,
    listing_url: &str,
    config: &AppConfig,
) -> Result<OfferImageMap, ScrapeError> {
    session.navigate(listing_url).await;
    session
        .scroll_to_bottom(
            config.inventory_scroll_step_px,
            Duration::from_millis(config.scroll_step_delay_ms),
            config.inventory_max_scroll_steps,
        )
        .await;

    let anchors: Vec<AnchorImage> = session
        .evaluate_value(ANCHOR_IMAGE_JS, "inventory anchor images")
        .await?;

    tracing::debug!(listing_url, count = anchors.len(), "correlated offer images");
    Ok(build_map(anchors))
}

/// First anchor wins when the grid repeats an offer id.
fn build_map(anchors: Vec<AnchorImage>) -> OfferImageMap {
    let mut map = OfferImageMap::new();
    for anchor in anchors {
        map.entry(anchor.id).or_insert(anchor.src);
    }
    map
}
