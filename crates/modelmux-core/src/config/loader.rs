//! Config loader — reads `~/.modelmux/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.modelmux/config.json`
//! 3. Environment variables `MODELMUX_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be
/// parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `MODELMUX_<SECTION>__<FIELD>` (double underscore as
/// delimiter).
///
/// Supported overrides:
/// - `MODELMUX_ROUTER__PREFERRED_FAMILY` → `router.preferred_family`
/// - `MODELMUX_ROUTER__REGION` → `router.region`
/// - `MODELMUX_ROUTER__TITAN_PAYLOAD_LIMIT` → `router.titan_payload_limit`
/// - `MODELMUX_ROUTER__DEFAULT_MODEL` → `router.default_model`
/// - `MODELMUX_ENDPOINT__NAME` → `endpoint.name`
/// - `MODELMUX_ENDPOINT__PREFERRED_MODEL_TYPE` → `endpoint.preferred_model_type`
/// - `MODELMUX_ENDPOINT__PREFERRED_MODEL_ID` → `endpoint.preferred_model_id`
/// - `MODELMUX_BEDROCK__API_BASE` / `__API_KEY` → `bedrock.*`
/// - `MODELMUX_SAGEMAKER__API_BASE` / `__API_KEY` → `sagemaker.*`
/// - `MODELMUX_PRICING__PATH` → `pricing.path`
fn apply_env_overrides(mut config: Config) -> Config {
    // Router
    if let Ok(val) = std::env::var("MODELMUX_ROUTER__PREFERRED_FAMILY") {
        config.router.preferred_family = val;
    }
    if let Ok(val) = std::env::var("MODELMUX_ROUTER__REGION") {
        config.router.region = val;
    }
    if let Ok(val) = std::env::var("MODELMUX_ROUTER__TITAN_PAYLOAD_LIMIT") {
        if let Ok(n) = val.parse::<usize>() {
            config.router.titan_payload_limit = n;
        }
    }
    if let Ok(val) = std::env::var("MODELMUX_ROUTER__DEFAULT_MODEL") {
        config.router.default_model = val;
    }

    // Endpoint
    if let Ok(val) = std::env::var("MODELMUX_ENDPOINT__NAME") {
        config.endpoint.name = val;
    }
    if let Ok(val) = std::env::var("MODELMUX_ENDPOINT__PREFERRED_MODEL_TYPE") {
        config.endpoint.preferred_model_type = val;
    }
    if let Ok(val) = std::env::var("MODELMUX_ENDPOINT__PREFERRED_MODEL_ID") {
        config.endpoint.preferred_model_id = val;
    }

    // Backends
    apply_backend_env(&mut config.bedrock, "BEDROCK");
    apply_backend_env(&mut config.sagemaker, "SAGEMAKER");

    // Pricing
    if let Ok(val) = std::env::var("MODELMUX_PRICING__PATH") {
        config.pricing.path = val;
    }

    config
}

/// Apply env var overrides for a single backend.
fn apply_backend_env(backend: &mut super::schema::BackendConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("MODELMUX_{name}__API_BASE")) {
        backend.api_base = Some(val);
    }
    if let Ok(val) = std::env::var(format!("MODELMUX_{name}__API_KEY")) {
        backend.api_key = val;
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
