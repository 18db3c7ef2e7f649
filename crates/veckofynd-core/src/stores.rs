use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// How a storefront's offers are extracted.
///
/// Each method names the highest-fidelity source the store exposes; every
/// method still degrades to lower tiers when that source yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// Role-labeled layout tree intercepted from the flyer renderer.
    Incito,
    /// Paged-publication hotspot payloads plus an inventory-view image pass.
    Inventory,
    /// Listing page that only links into a paginated catalog API.
    StoreSpecific,
    /// Retailer-native offer API called by the store's own page.
    VendorApi,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::Incito => write!(f, "incito"),
            ExtractionMethod::Inventory => write!(f, "inventory"),
            ExtractionMethod::StoreSpecific => write!(f, "store-specific"),
            ExtractionMethod::VendorApi => write!(f, "vendor-api"),
        }
    }
}

/// One storefront entry from `stores.yaml`.
///
/// Read once at run start and immutable for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    pub url: String,
    pub method: ExtractionMethod,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreConfig>,
}

impl StoresFile {
    /// The stores that should actually be scraped, in file order.
    #[must_use]
    pub fn enabled(&self) -> Vec<StoreConfig> {
        self.stores.iter().filter(|s| s.enabled).cloned().collect()
    }
}

/// Load and validate the store configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores_file: StoresFile = serde_yaml::from_str(&content)?;

    validate_stores(&stores_file)?;

    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for store in &stores_file.stores {
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store name must be non-empty".to_string(),
            ));
        }

        if !store.url.starts_with("http://") && !store.url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "store '{}' has non-absolute url '{}'",
                store.name, store.url
            )));
        }

        let lower_name = store.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate store name: '{}'",
                store.name
            )));
        }
    }

    Ok(())
}
