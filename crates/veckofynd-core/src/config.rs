use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Default user agent, matching a desktop Chrome build. Flyer sites serve a
/// reduced mobile layout (and fewer API calls) to unknown agents.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing logic, decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var`
/// needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<bool>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let headless = parse_bool("VECKOFYND_HEADLESS", "true")?;
    let viewport_width = parse_u32("VECKOFYND_VIEWPORT_WIDTH", "1280")?;
    let viewport_height = parse_u32("VECKOFYND_VIEWPORT_HEIGHT", "900")?;
    let locale = or_default("VECKOFYND_LOCALE", "sv-SE");
    let user_agent = or_default("VECKOFYND_USER_AGENT", DEFAULT_USER_AGENT);
    let chromium_path = lookup("VECKOFYND_CHROMIUM_PATH").ok().map(PathBuf::from);

    let navigation_timeout_ms = parse_u64("VECKOFYND_NAVIGATION_TIMEOUT_MS", "30000")?;
    let network_idle_timeout_ms = parse_u64("VECKOFYND_NETWORK_IDLE_TIMEOUT_MS", "20000")?;
    let settle_delay_ms = parse_u64("VECKOFYND_SETTLE_DELAY_MS", "2000")?;
    let request_timeout_secs = parse_u64("VECKOFYND_REQUEST_TIMEOUT_SECS", "10")?;

    let scroll_step_px = parse_u32("VECKOFYND_SCROLL_STEP_PX", "500")?;
    let scroll_step_delay_ms = parse_u64("VECKOFYND_SCROLL_STEP_DELAY_MS", "500")?;
    let max_scroll_steps = parse_u32("VECKOFYND_MAX_SCROLL_STEPS", "25")?;
    let inventory_scroll_step_px = parse_u32("VECKOFYND_INVENTORY_SCROLL_STEP_PX", "150")?;
    let inventory_max_scroll_steps = parse_u32("VECKOFYND_INVENTORY_MAX_SCROLL_STEPS", "25")?;
    let max_catalog_pages = parse_u32("VECKOFYND_MAX_CATALOG_PAGES", "50")?;

    let stores_path = PathBuf::from(or_default("VECKOFYND_STORES_PATH", "./config/stores.yaml"));
    let output_path = PathBuf::from(or_default("VECKOFYND_OUTPUT_PATH", "./deals.json"));
    let log_level = or_default("VECKOFYND_LOG_LEVEL", "info");

    Ok(AppConfig {
        headless,
        viewport_width,
        viewport_height,
        locale,
        user_agent,
        chromium_path,
        navigation_timeout_ms,
        network_idle_timeout_ms,
        settle_delay_ms,
        request_timeout_secs,
        scroll_step_px,
        scroll_step_delay_ms,
        max_scroll_steps,
        inventory_scroll_step_px,
        inventory_max_scroll_steps,
        max_catalog_pages,
        stores_path,
        output_path,
        log_level,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.headless);
        assert_eq!(cfg.viewport_width, 1280);
        assert_eq!(cfg.viewport_height, 900);
        assert_eq!(cfg.locale, "sv-SE");
        assert_eq!(cfg.navigation_timeout_ms, 30_000);
        assert_eq!(cfg.network_idle_timeout_ms, 20_000);
        assert_eq!(cfg.settle_delay_ms, 2_000);
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.scroll_step_px, 500);
        assert_eq!(cfg.scroll_step_delay_ms, 500);
        assert_eq!(cfg.max_scroll_steps, 25);
        assert_eq!(cfg.inventory_scroll_step_px, 150);
        assert_eq!(cfg.inventory_max_scroll_steps, 25);
        assert_eq!(cfg.max_catalog_pages, 50);
        assert_eq!(cfg.stores_path, PathBuf::from("./config/stores.yaml"));
        assert_eq!(cfg.output_path, PathBuf::from("./deals.json"));
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.chromium_path.is_none());
    }

    #[test]
    fn build_app_config_headless_override() {
        let mut map = HashMap::new();
        map.insert("VECKOFYND_HEADLESS", "false");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(!cfg.headless);
    }

    #[test]
    fn build_app_config_headless_invalid() {
        let mut map = HashMap::new();
        map.insert("VECKOFYND_HEADLESS", "maybe");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VECKOFYND_HEADLESS"),
            "expected InvalidEnvVar(VECKOFYND_HEADLESS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_navigation_timeout_override() {
        let mut map = HashMap::new();
        map.insert("VECKOFYND_NAVIGATION_TIMEOUT_MS", "5000");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.navigation_timeout_ms, 5000);
    }

    #[test]
    fn build_app_config_navigation_timeout_invalid() {
        let mut map = HashMap::new();
        map.insert("VECKOFYND_NAVIGATION_TIMEOUT_MS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VECKOFYND_NAVIGATION_TIMEOUT_MS"),
            "expected InvalidEnvVar(VECKOFYND_NAVIGATION_TIMEOUT_MS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_max_catalog_pages_invalid() {
        let mut map = HashMap::new();
        map.insert("VECKOFYND_MAX_CATALOG_PAGES", "-1");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VECKOFYND_MAX_CATALOG_PAGES"),
            "expected InvalidEnvVar(VECKOFYND_MAX_CATALOG_PAGES), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_chromium_path_override() {
        let mut map = HashMap::new();
        map.insert("VECKOFYND_CHROMIUM_PATH", "/opt/chromium/chrome");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(
            cfg.chromium_path.as_deref(),
            Some(std::path::Path::new("/opt/chromium/chrome"))
        );
    }

    #[test]
    fn build_app_config_paths_override() {
        let mut map = HashMap::new();
        map.insert("VECKOFYND_STORES_PATH", "/etc/veckofynd/stores.yaml");
        map.insert("VECKOFYND_OUTPUT_PATH", "/tmp/deals.json");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.stores_path, PathBuf::from("/etc/veckofynd/stores.yaml"));
        assert_eq!(cfg.output_path, PathBuf::from("/tmp/deals.json"));
    }
}
