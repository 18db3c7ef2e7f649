//! Offer extraction pipeline.
//!
//! For each enabled store the orchestrator attaches a response capture,
//! drives the session through the store's page, and hands the buffered
//! payloads to the adapter chain implied by the store's extraction method.
//! Tiers degrade in fidelity: structured capture first, rendered page text
//! last. A single store's failure is caught here and never aborts the batch.

mod formats;
mod images;
mod types;

pub use types::OfferRecord;

use std::collections::HashSet;
use std::time::Duration;

use veckofynd_core::{AppConfig, ExtractionMethod, StoreConfig};

use crate::capture::{CapturedResponse, ResponseCapture, PROVIDER_URL_PATTERNS};
use crate::error::ScrapeError;
use crate::session::Session;
use images::OfferImageMap;

/// Catalog API origin used by the store-specific page walk.
const PUBLICATION_API_BASE: &str = "https://squid-api.tjek.com/v2";

/// Outcome of a full run: the deduplicated offer list plus which stores
/// failed, so the caller can report without re-deriving it from logs.
#[derive(Debug, Default)]
pub struct RunReport {
    pub offers: Vec<OfferRecord>,
    pub failed_stores: Vec<String>,
}

/// Scrape every enabled store in order and deduplicate the combined result.
///
/// Stores marked disabled are skipped without any extraction call. Errors
/// from a single store are logged and recorded in the report; the run
/// continues with the next store.
pub async fn scrape_all(
    session: &Session,
    client: &reqwest::Client,
    config: &AppConfig,
    stores: &[StoreConfig],
) -> RunReport {
    let mut report = RunReport::default();

    for store in stores_to_process(stores) {
        tracing::info!(
            store = %store.name,
            url = %store.url,
            method = %store.method,
            "scraping store"
        );

        match scrape_store(session, client, config, store).await {
            Ok(records) => {
                tracing::info!(store = %store.name, count = records.len(), "store extraction finished");
                report.offers.extend(records);
            }
            Err(error) => {
                tracing::warn!(store = %store.name, %error, "store extraction failed; continuing");
                report.failed_stores.push(store.name.clone());
            }
        }
    }

    report.offers = dedup_offers(report.offers);
    report
}

/// The stores the run will actually touch, in configuration order.
fn stores_to_process(stores: &[StoreConfig]) -> Vec<&StoreConfig> {
    stores
        .iter()
        .filter(|store| {
            if !store.enabled {
                tracing::debug!(store = %store.name, "store disabled; skipping");
            }
            store.enabled
        })
        .collect()
}

async fn scrape_store(
    session: &Session,
    client: &reqwest::Client,
    config: &AppConfig,
    store: &StoreConfig,
) -> Result<Vec<OfferRecord>, ScrapeError> {
    match store.method {
        ExtractionMethod::Incito => scrape_incito_store(session, config, store).await,
        ExtractionMethod::Inventory => scrape_inventory_store(session, config, store).await,
        ExtractionMethod::StoreSpecific => {
            scrape_publication_store(session, client, config, store).await
        }
        ExtractionMethod::VendorApi => scrape_vendor_store(session, config, store).await,
    }
}

/// Navigate a store page with a capture attached and return what it buffered.
///
/// The capture is detached before this returns, so responses triggered by
/// anything that happens afterwards (image pass, next store) cannot be
/// misattributed.
async fn capture_store_responses(
    session: &Session,
    config: &AppConfig,
    url: &str,
) -> Result<Vec<CapturedResponse>, ScrapeError> {
    let capture = ResponseCapture::attach(session.page(), &PROVIDER_URL_PATTERNS).await?;
    session.navigate(url).await;
    session
        .scroll_to_bottom(
            config.scroll_step_px,
            Duration::from_millis(config.scroll_step_delay_ms),
            config.max_scroll_steps,
        )
        .await;
    Ok(capture.detach().await)
}

async fn scrape_incito_store(
    session: &Session,
    config: &AppConfig,
    store: &StoreConfig,
) -> Result<Vec<OfferRecord>, ScrapeError> {
    let captured = capture_store_responses(session, config, &store.url).await?;

    let mut records = incito_records(&captured, &store.name);
    if records.is_empty() {
        records = hotspot_records(&captured, &store.name, None);
    }
    if records.is_empty() {
        records = dom_fallback(session, store).await?;
    }
    Ok(records)
}

async fn scrape_inventory_store(
    session: &Session,
    config: &AppConfig,
    store: &StoreConfig,
) -> Result<Vec<OfferRecord>, ScrapeError> {
    let captured = capture_store_responses(session, config, &store.url).await?;
    let images = offer_images_or_empty(session, config, store).await;

    let mut records = hotspot_records(&captured, &store.name, Some(&images));
    if records.is_empty() {
        records = incito_records(&captured, &store.name);
    }
    if records.is_empty() {
        records = dom_fallback(session, store).await?;
    }
    Ok(records)
}

async fn scrape_publication_store(
    session: &Session,
    client: &reqwest::Client,
    config: &AppConfig,
    store: &StoreConfig,
) -> Result<Vec<OfferRecord>, ScrapeError> {
    let captured = capture_store_responses(session, config, &store.url).await?;
    let html = session.page_html().await?;

    let Some(publication_id) = formats::resolve_publication_id(&captured, &html) else {
        tracing::warn!(store = %store.name, "no publication id on listing page");
        return dom_fallback(session, store).await;
    };
    tracing::debug!(store = %store.name, publication_id, "resolved publication id");

    let images = offer_images_or_empty(session, config, store).await;
    let records = formats::fetch_publication_offers(
        client,
        PUBLICATION_API_BASE,
        &publication_id,
        &store.name,
        &images,
        config.max_catalog_pages,
    )
    .await;

    if records.is_empty() {
        return dom_fallback(session, store).await;
    }
    Ok(records)
}

async fn scrape_vendor_store(
    session: &Session,
    config: &AppConfig,
    store: &StoreConfig,
) -> Result<Vec<OfferRecord>, ScrapeError> {
    let captured = capture_store_responses(session, config, &store.url).await?;

    let mut records = vendor_records(&captured, &store.name);
    if records.is_empty() {
        records = dom_fallback(session, store).await?;
    }
    Ok(records)
}

/// A failed image pass costs images, never offers.
async fn offer_images_or_empty(
    session: &Session,
    config: &AppConfig,
    store: &StoreConfig,
) -> OfferImageMap {
    match images::collect_offer_images(session, &store.url, config).await {
        Ok(map) => map,
        Err(error) => {
            tracing::warn!(store = %store.name, %error, "inventory image pass failed; offers stay imageless");
            OfferImageMap::new()
        }
    }
}

async fn dom_fallback(
    session: &Session,
    store: &StoreConfig,
) -> Result<Vec<OfferRecord>, ScrapeError> {
    tracing::warn!(store = %store.name, "no structured source yielded offers; reading page text");
    let text = session.body_text().await?;
    let records = formats::extract_text_offers(&text, &store.name);
    tracing::info!(store = %store.name, count = records.len(), "page-text fallback finished");
    Ok(records)
}

fn incito_records(captured: &[CapturedResponse], store: &str) -> Vec<OfferRecord> {
    captured
        .iter()
        .filter(|r| r.url.contains("incito") || r.url.contains("generate_incito"))
        .flat_map(|r| formats::extract_incito_offers(&r.body, store))
        .collect()
}

fn hotspot_records(
    captured: &[CapturedResponse],
    store: &str,
    images: Option<&OfferImageMap>,
) -> Vec<OfferRecord> {
    captured
        .iter()
        .filter(|r| r.url.contains("paged-publications"))
        .flat_map(|r| formats::extract_hotspot_offers(&r.body, store, images))
        .collect()
}

fn vendor_records(captured: &[CapturedResponse], store: &str) -> Vec<OfferRecord> {
    captured
        .iter()
        .filter(|r| r.url.contains("api.coop.se"))
        .flat_map(|r| formats::extract_vendor_offers(&r.body, store))
        .collect()
}

/// Keep the first occurrence of every `(store, name)` pair.
fn dedup_offers(offers: Vec<OfferRecord>) -> Vec<OfferRecord> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    offers
        .into_iter()
        .filter(|offer| seen.insert((offer.store.clone(), offer.name.clone())))
        .collect()
}
