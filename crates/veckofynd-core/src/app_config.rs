use std::path::PathBuf;

/// Runtime settings for a scrape run.
///
/// All values have defaults tuned for the Swedish flyer sites the pipeline
/// targets; anything can be overridden through `VECKOFYND_*` env vars.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Launch the browser without a visible window.
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Accept-Language sent by the browser page.
    pub locale: String,
    pub user_agent: String,
    /// Explicit Chromium binary path; when unset the binary is discovered
    /// from the PATH.
    pub chromium_path: Option<PathBuf>,
    /// Upper bound on a single page load.
    pub navigation_timeout_ms: u64,
    /// Separate bound on the post-load network-quiescence wait.
    pub network_idle_timeout_ms: u64,
    /// Settle delay after navigation and scrolling, letting late XHRs land.
    pub settle_delay_ms: u64,
    /// Timeout for individual catalog-API requests.
    pub request_timeout_secs: u64,
    pub scroll_step_px: u32,
    pub scroll_step_delay_ms: u64,
    pub max_scroll_steps: u32,
    /// The inventory grid lazy-loads in smaller increments than the flyer
    /// viewer, so the image pass scrolls with its own settings.
    pub inventory_scroll_step_px: u32,
    pub inventory_max_scroll_steps: u32,
    /// Hard cap on sequential catalog-API pages per store.
    pub max_catalog_pages: u32,
    pub stores_path: PathBuf,
    pub output_path: PathBuf,
    pub log_level: String,
}
