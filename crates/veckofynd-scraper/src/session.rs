//! Headless-Chromium session shared by every store in a run.
//!
//! One browser and one page are launched up front and reused for the whole
//! batch; the orchestrator drives navigation store by store. Navigation
//! problems are downgraded to warnings so a slow or broken storefront can
//! fall through to the next extraction tier instead of aborting the run.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use veckofynd_core::AppConfig;

use crate::error::ScrapeError;

/// Find a Chromium binary on the PATH.
///
/// The configured override is preferred; `chromiumoxide`'s own detection is
/// the last resort when nothing is found here.
fn resolve_chromium(config: &AppConfig) -> Option<PathBuf> {
    if let Some(path) = &config.chromium_path {
        if path.exists() {
            return Some(path.clone());
        }
        tracing::warn!(
            path = %path.display(),
            "configured Chromium path does not exist; falling back to PATH lookup"
        );
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    None
}

/// A running browser with a single reusable page.
pub struct Session {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
    network_idle_timeout: Duration,
    settle_delay: Duration,
}

impl Session {
    /// Launch headless Chromium and open the page used for every store.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Launch`] or [`ScrapeError::Browser`] when the
    /// browser cannot be started. This is the only process-fatal failure in
    /// the pipeline: without a browser no store can be scraped.
    pub async fn launch(config: &AppConfig) -> Result<Self, ScrapeError> {
        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--lang={}", config.locale));

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = resolve_chromium(config) {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder
            .build()
            .map_err(|reason| ScrapeError::Launch { reason })?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;

        // The CDP handler must be polled for the connection to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser.new_page("about:blank").await?;

        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(&config.user_agent)
            .accept_language(&config.locale)
            .build()
            .map_err(|reason| ScrapeError::Launch { reason })?;
        page.set_user_agent(user_agent).await?;

        Ok(Self {
            browser,
            page,
            handler_task,
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            network_idle_timeout: Duration::from_millis(config.network_idle_timeout_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        })
    }

    /// The underlying page, for attaching a response capture.
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Load a URL and wait for the page to settle.
    ///
    /// Both the load and the quiescence wait are bounded separately; hitting
    /// either bound is a warning, not a failure — the page is left in
    /// whatever state it reached and extraction proceeds from there.
    pub async fn navigate(&self, url: &str) {
        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(error)) => {
                tracing::warn!(url, %error, "navigation failed; continuing with current page state");
                return;
            }
            Err(_) => {
                tracing::warn!(
                    url,
                    timeout_ms = self.navigation_timeout.as_millis() as u64,
                    "navigation timed out; continuing with current page state"
                );
            }
        }

        if tokio::time::timeout(self.network_idle_timeout, self.page.wait_for_navigation())
            .await
            .is_err()
        {
            tracing::warn!(url, "network quiescence wait timed out");
        }

        tokio::time::sleep(self.settle_delay).await;
    }

    /// Step the scroll position down the page until the measured scroll
    /// height stops growing or `max_steps` is reached.
    ///
    /// Flyer pages render sections lazily; this is what forces them (and the
    /// API requests that feed them) to load before extraction.
    pub async fn scroll_to_bottom(&self, step_px: u32, step_delay: Duration, max_steps: u32) {
        let Ok(mut height) = self.scroll_height().await else {
            tracing::warn!("could not measure scroll height; skipping scroll");
            return;
        };

        let mut position: u64 = 0;
        for _ in 0..max_steps {
            if position >= height {
                break;
            }
            position += u64::from(step_px);

            if let Err(error) = self
                .page
                .evaluate(format!("window.scrollTo(0, {position})"))
                .await
            {
                tracing::warn!(%error, "scroll step failed; stopping scroll");
                break;
            }
            tokio::time::sleep(step_delay).await;

            match self.scroll_height().await {
                Ok(measured) => height = measured,
                Err(_) => break,
            }
        }
    }

    async fn scroll_height(&self) -> Result<u64, ScrapeError> {
        self.evaluate_value("document.body.scrollHeight", "scroll height")
            .await
    }

    /// The page's visible text, used by the lowest-fidelity extraction tier.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Evaluate`] when the page cannot be evaluated.
    pub async fn body_text(&self) -> Result<String, ScrapeError> {
        self.evaluate_value("document.body.innerText", "page text")
            .await
    }

    /// The full serialized document.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Evaluate`] when the page cannot be evaluated.
    pub async fn page_html(&self) -> Result<String, ScrapeError> {
        self.evaluate_value("document.documentElement.outerHTML", "page html")
            .await
    }

    /// Evaluate a script and deserialize its completion value.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Browser`] if the evaluation itself fails and
    /// [`ScrapeError::Evaluate`] if the result does not match `T`.
    pub async fn evaluate_value<T: DeserializeOwned>(
        &self,
        js: &str,
        context: &str,
    ) -> Result<T, ScrapeError> {
        let result = self.page.evaluate(js).await?;
        result
            .into_value::<T>()
            .map_err(|e| ScrapeError::Evaluate {
                context: context.to_string(),
                reason: e.to_string(),
            })
    }

    /// Close the page and browser and stop the CDP handler task.
    pub async fn close(self) {
        let Session {
            mut browser,
            page,
            handler_task,
            ..
        } = self;

        if let Err(error) = page.close().await {
            tracing::debug!(%error, "page close failed");
        }
        if let Err(error) = browser.close().await {
            tracing::debug!(%error, "browser close failed");
        }
        let _ = tokio::time::timeout(Duration::from_secs(5), browser.wait()).await;
        handler_task.abort();
    }
}
