//! Sequential catalog-API page walk.
//!
//! Some stores are only exposed as a listing page linking into a paginated
//! catalog API — there is no flyer document to intercept. The publication id
//! is resolved from whatever the listing page did reveal, then numbered
//! pages are fetched until one fails. A failed fetch means "no more pages",
//! not an error; a page cap guarantees termination even if that signal never
//! arrives.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::capture::CapturedResponse;
use crate::offers::formats::{hotspot, offer_array};
use crate::offers::images::OfferImageMap;
use crate::offers::OfferRecord;

static PUBLICATION_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"paged-publications/([A-Za-z0-9_-]{4,})").expect("valid regex"));
static PUBLICATION_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"publication=([A-Za-z0-9_-]{4,})").expect("valid regex"));

/// Resolve the publication id behind a store listing page.
///
/// Captured provider URLs are exact, so they are preferred; the page HTML is
/// only pattern-matched when the listing made no captured calls.
pub(in crate::offers) fn resolve_publication_id(
    captured: &[CapturedResponse],
    page_html: &str,
) -> Option<String> {
    for response in captured {
        if let Some(cap) = PUBLICATION_PATH_RE.captures(&response.url) {
            return Some(cap[1].to_string());
        }
    }

    PUBLICATION_PATH_RE
        .captures(page_html)
        .or_else(|| PUBLICATION_PARAM_RE.captures(page_html))
        .map(|cap| cap[1].to_string())
}

/// Walk the catalog API page by page, collecting offers.
///
/// Offers are deduplicated by their identifier within the run, and each one
/// gets an image from the inventory map by that same identifier. The loop
/// ends on the first failed fetch (request error, non-2xx status, or an
/// unparseable body) or at `max_pages`.
pub(in crate::offers) async fn fetch_publication_offers(
    client: &reqwest::Client,
    api_base: &str,
    publication_id: &str,
    store: &str,
    images: &OfferImageMap,
    max_pages: u32,
) -> Vec<OfferRecord> {
    let mut records = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for page in 1..=max_pages {
        let url = format!("{api_base}/publications/{publication_id}/offers?page={page}");

        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%error, page, "catalog page fetch failed; end of catalog");
                break;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), page, "catalog page not available; end of catalog");
            break;
        }
        let Ok(body) = response.json::<Value>().await else {
            tracing::debug!(page, "catalog page body not parseable; end of catalog");
            break;
        };

        let Some(items) = offer_array(&body) else {
            continue;
        };
        for item in items {
            let Some((id, record)) = hotspot::parse_single_offer(item, store, Some(images)) else {
                continue;
            };
            if let Some(id) = id {
                if !seen_ids.insert(id) {
                    continue;
                }
            }
            records.push(record);
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn captured(url: &str) -> CapturedResponse {
        CapturedResponse {
            url: url.to_string(),
            body: Value::Null,
        }
    }

    #[test]
    fn publication_id_prefers_captured_urls() {
        let captures = vec![
            captured("https://cdn.example.net/app.js"),
            captured("https://api.example.net/paged-publications/a8Xzy3/pages"),
        ];
        let html = r#"<a href="?publication=ZZZZZZ">flyer</a>"#;
        assert_eq!(
            resolve_publication_id(&captures, html).as_deref(),
            Some("a8Xzy3")
        );
    }

    #[test]
    fn publication_id_falls_back_to_page_html() {
        let html = r#"<a href="/ICA-Supermarket/?publication=b7Wqp2">Se bladet</a>"#;
        assert_eq!(
            resolve_publication_id(&[], html).as_deref(),
            Some("b7Wqp2")
        );
    }

    #[test]
    fn publication_id_none_when_nothing_matches() {
        assert!(resolve_publication_id(&[], "<html><body>tomt</body></html>").is_none());
    }

    fn offer(id: &str, heading: &str) -> Value {
        json!({"id": id, "heading": heading, "pricing": {"price": 10}})
    }

    async fn mount_page(server: &MockServer, publication: &str, page: &str, offers: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/publications/{publication}/offers")))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"offers": offers})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn walks_pages_until_fetch_fails() {
        let server = MockServer::start().await;
        mount_page(&server, "pub1", "1", json!([offer("o1", "Mjölk"), offer("o2", "Ost")])).await;
        mount_page(&server, "pub1", "2", json!([offer("o3", "Ägg")])).await;
        // Page 3 has no mock: wiremock answers 404, which ends the walk.

        let client = reqwest::Client::new();
        let records = fetch_publication_offers(
            &client,
            &server.uri(),
            "pub1",
            "ICA Globen",
            &OfferImageMap::new(),
            50,
        )
        .await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Mjölk");
        assert_eq!(records[2].name, "Ägg");
    }

    #[tokio::test]
    async fn deduplicates_offers_by_id_across_pages() {
        let server = MockServer::start().await;
        mount_page(&server, "pub1", "1", json!([offer("o1", "Mjölk")])).await;
        mount_page(&server, "pub1", "2", json!([offer("o1", "Mjölk"), offer("o2", "Ost")])).await;

        let client = reqwest::Client::new();
        let records = fetch_publication_offers(
            &client,
            &server.uri(),
            "pub1",
            "ICA Globen",
            &OfferImageMap::new(),
            50,
        )
        .await;

        assert_eq!(records.len(), 2, "repeated offer id is kept once");
    }

    #[tokio::test]
    async fn page_cap_bounds_the_walk() {
        let server = MockServer::start().await;
        // Every page answers 200 with one fresh offer; only the cap stops us.
        Mock::given(method("GET"))
            .and(path("/publications/pub1/offers"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"offers": [offer("same", "Smör")]})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let records = fetch_publication_offers(
            &client,
            &server.uri(),
            "pub1",
            "ICA Globen",
            &OfferImageMap::new(),
            3,
        )
        .await;

        assert_eq!(records.len(), 1, "same id on every page dedups to one");
    }

    #[tokio::test]
    async fn images_attached_from_inventory_map() {
        let server = MockServer::start().await;
        mount_page(&server, "pub1", "1", json!([offer("o1", "Mjölk")])).await;

        let mut images = OfferImageMap::new();
        images.insert("o1".to_string(), "https://x/mjolk.jpg".to_string());

        let client = reqwest::Client::new();
        let records =
            fetch_publication_offers(&client, &server.uri(), "pub1", "ICA Globen", &images, 50)
                .await;

        assert_eq!(records[0].image.as_deref(), Some("https://x/mjolk.jpg"));
    }
}
