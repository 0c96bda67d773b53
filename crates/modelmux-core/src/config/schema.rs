//! Configuration schema.
//!
//! Hierarchy: `Config` → `RouterConfig`, `EndpointConfig`, `BackendConfig`
//! (one per backend), `PricingConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.modelmux/config.json` + env vars.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub router: RouterConfig,
    pub endpoint: EndpointConfig,
    pub bedrock: BackendConfig,
    pub sagemaker: BackendConfig,
    pub pricing: PricingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            endpoint: EndpointConfig::default(),
            bedrock: BackendConfig::default(),
            sagemaker: BackendConfig::default(),
            pricing: PricingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────

/// Routing preferences and regional settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterConfig {
    /// Preferred provider family: `"bedrock"` (default) or `"jumpstart"`.
    pub preferred_family: String,
    /// Active region, used for backend URLs and pricing-row filtering.
    pub region: String,
    /// Payload ceiling (in characters) for the Titan-family text backend.
    pub titan_payload_limit: usize,
    /// Preferred default model display name.
    pub default_model: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            preferred_family: "bedrock".to_string(),
            region: "us-east-1".to_string(),
            titan_payload_limit: 20_000,
            default_model: "Anthropic Claude V2.1".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Endpoint (Jumpstart family)
// ─────────────────────────────────────────────

/// Named-endpoint settings for the Jumpstart family.
///
/// An empty `name` means no endpoint is deployed — the family is treated
/// as unavailable, not as an error.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointConfig {
    /// The inference endpoint name. Empty = not deployed.
    #[serde(default)]
    pub name: String,
    /// Model type served by the endpoint, e.g. `"falcon"` or `"llama-2-13b-chat"`.
    #[serde(default)]
    pub preferred_model_type: String,
    /// Model id served by the endpoint, for cost lookups.
    #[serde(default)]
    pub preferred_model_id: String,
}

impl EndpointConfig {
    /// Whether an endpoint name is configured at all.
    pub fn is_configured(&self) -> bool {
        !self.name.is_empty() && self.name != "None"
    }
}

// ─────────────────────────────────────────────
// Backends
// ─────────────────────────────────────────────

/// Connection settings for one HTTP backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendConfig {
    /// Custom API base URL (overrides the regional default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Bearer token sent with each request. Signing happens upstream.
    #[serde(default)]
    pub api_key: String,
}

// ─────────────────────────────────────────────
// Pricing
// ─────────────────────────────────────────────

/// Location of the per-model pricing table.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingConfig {
    /// Path to the pricing CSV (`region, model_id, input_token_price,
    /// output_token_price`).
    pub path: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            path: "pricing/llm_pricing.csv".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.router.preferred_family, "bedrock");
        assert_eq!(config.router.region, "us-east-1");
        assert_eq!(config.router.titan_payload_limit, 20_000);
        assert_eq!(config.router.default_model, "Anthropic Claude V2.1");
        assert!(!config.endpoint.is_configured());
    }

    #[test]
    fn test_config_from_json_camel_case() {
        let json = serde_json::json!({
            "router": {
                "preferredFamily": "jumpstart",
                "region": "eu-west-1",
                "titanPayloadLimit": 8000
            },
            "endpoint": {
                "name": "my-llm-endpoint",
                "preferredModelType": "falcon"
            }
        });

        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.router.preferred_family, "jumpstart");
        assert_eq!(config.router.region, "eu-west-1");
        assert_eq!(config.router.titan_payload_limit, 8000);
        assert_eq!(config.endpoint.name, "my-llm-endpoint");
        assert!(config.endpoint.is_configured());
        // Defaults preserved for missing fields
        assert_eq!(config.router.default_model, "Anthropic Claude V2.1");
        assert_eq!(config.pricing.path, "pricing/llm_pricing.csv");
    }

    #[test]
    fn test_endpoint_literal_none_is_unconfigured() {
        let endpoint = EndpointConfig {
            name: "None".to_string(),
            ..Default::default()
        };
        assert!(!endpoint.is_configured());
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let mut config = Config::default();
        config.bedrock.api_base = Some("http://localhost:9000".to_string());
        let json_str = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json_str).unwrap();
        assert_eq!(
            deserialized.bedrock.api_base.as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(deserialized.router.region, config.router.region);
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let config = Config::default();
        let json = serde_json::to_value(&config).unwrap();
        assert!(json["router"].get("preferredFamily").is_some());
        assert!(json["router"].get("titanPayloadLimit").is_some());
        // Should NOT have snake_case keys
        assert!(json["router"].get("preferred_family").is_none());
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.router.region, "us-east-1");
        assert!(config.bedrock.api_base.is_none());
    }
}
