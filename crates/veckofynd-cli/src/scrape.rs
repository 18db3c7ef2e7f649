//! The scrape command: drive the pipeline and write the offer array.

use std::time::Duration;

use anyhow::Context;
use veckofynd_core::AppConfig;
use veckofynd_scraper::{scrape_all, Session};

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let stores_file = veckofynd_core::load_stores(&config.stores_path)
        .with_context(|| format!("loading {}", config.stores_path.display()))?;
    tracing::info!(
        stores = stores_file.stores.len(),
        enabled = stores_file.enabled().len(),
        "loaded store configuration"
    );

    // The one process-fatal failure: without a browser no store can be
    // scraped, so this aborts instead of degrading.
    let session = Session::launch(config)
        .await
        .context("browser session startup failed")?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(&config.user_agent)
        .build()
        .context("building HTTP client")?;

    let report = scrape_all(&session, &client, config, &stores_file.stores).await;
    session.close().await;

    let json = serde_json::to_string_pretty(&report.offers)?;
    std::fs::write(&config.output_path, json)
        .with_context(|| format!("writing {}", config.output_path.display()))?;

    tracing::info!(
        offers = report.offers.len(),
        failed_stores = report.failed_stores.len(),
        output = %config.output_path.display(),
        "run finished"
    );
    for store in &report.failed_stores {
        tracing::warn!(store = %store, "store failed during this run");
    }

    Ok(())
}
