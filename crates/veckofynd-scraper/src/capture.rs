//! Network-response interception scoped to a single store's navigation.
//!
//! The flyer sites load their offer data over XHR from a handful of known
//! provider endpoints. A capture is attached to the page before navigating,
//! buffers every matching JSON body, and MUST be detached once the store's
//! navigation is done — a listener left attached would attribute the next
//! store's responses to the wrong store.

use std::sync::Arc;

use chromiumoxide::cdp::browser_protocol::network::{
    EventResponseReceived, GetResponseBodyParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::ScrapeError;

/// URL substrings identifying the offer-bearing endpoints worth buffering.
pub const PROVIDER_URL_PATTERNS: [&str; 4] =
    ["tjek.com", "incito", "paged-publications", "api.coop.se"];

/// One buffered provider response: the URL it came from and its parsed body.
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    pub url: String,
    pub body: serde_json::Value,
}

fn is_provider_url(url: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| url.contains(pattern))
}

/// A live capture: a CDP listener task filling an explicit shared buffer.
pub struct ResponseCapture {
    buffer: Arc<Mutex<Vec<CapturedResponse>>>,
    listener: JoinHandle<()>,
}

impl ResponseCapture {
    /// Register a `Network.responseReceived` listener on the page.
    ///
    /// Matching responses have their bodies fetched over CDP and parsed as
    /// JSON; a body that cannot be fetched or decoded is dropped silently —
    /// the response is simply not buffered.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Browser`] if the listener cannot be registered.
    pub async fn attach(
        page: &Page,
        patterns: &'static [&'static str],
    ) -> Result<Self, ScrapeError> {
        let mut events = page.event_listener::<EventResponseReceived>().await?;
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let page = page.clone();

        let listener = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let url = event.response.url.clone();
                if !is_provider_url(&url, patterns) {
                    continue;
                }
                if !event.response.mime_type.contains("json") {
                    continue;
                }

                let Ok(reply) = page
                    .execute(GetResponseBodyParams::new(event.request_id.clone()))
                    .await
                else {
                    continue;
                };
                if reply.base64_encoded {
                    continue;
                }
                let Ok(body) = serde_json::from_str::<serde_json::Value>(&reply.body) else {
                    continue;
                };

                tracing::debug!(url = %url, "captured provider response");
                sink.lock().await.push(CapturedResponse { url, body });
            }
        });

        Ok(Self { buffer, listener })
    }

    /// Deregister the listener and hand back everything buffered so far.
    pub async fn detach(self) -> Vec<CapturedResponse> {
        self.listener.abort();
        let mut guard = self.buffer.lock().await;
        std::mem::take(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_provider_urls() {
        for url in [
            "https://squid-api.tjek.com/v2/offers?catalog_id=abc",
            "https://incito-gateway.example.net/generate_incito",
            "https://api.example.net/paged-publications/xyz/pages",
            "https://external.api.coop.se/personalisation/offers",
        ] {
            assert!(
                is_provider_url(url, &PROVIDER_URL_PATTERNS),
                "should match: {url}"
            );
        }
    }

    #[test]
    fn ignores_unrelated_urls() {
        for url in [
            "https://ereklamblad.se/ICA-Supermarket/",
            "https://cdn.example.net/analytics.js",
            "https://fonts.gstatic.com/s/roboto.woff2",
        ] {
            assert!(
                !is_provider_url(url, &PROVIDER_URL_PATTERNS),
                "should not match: {url}"
            );
        }
    }
}
