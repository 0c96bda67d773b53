//! Model registry — ordered dispatch tables and the selectable model menu.
//!
//! Lookup works on substrings: the requested name is scanned against an
//! ordered list of id fragments, first match wins. The order is the
//! priority: wherever one fragment contains another (`claude-v1-100k`
//! vs `claude-v1`), the longer fragment comes first so the more specific
//! adapter is chosen. A test below enforces that ordering invariant for
//! every pair.

use std::collections::HashMap;

use tracing::{info, warn};

use modelmux_core::types::{Family, Modality};
use modelmux_core::utils::to_display_name;

use crate::catalog::DiscoveredModels;

// ─────────────────────────────────────────────
// AdapterSpec — one row of a dispatch table
// ─────────────────────────────────────────────

/// How a model's request/response translation is implemented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdapterKind {
    // Bedrock family
    TitanText,
    TitanEmbedding,
    ClaudeMessages,
    ClaudePrompt,
    Ai21,
    Llama2,
    Mistral,
    Cohere,
    Sdxl,
    // Jumpstart family (named endpoint)
    EndpointFalcon,
    EndpointFlanT5,
    EndpointAi21,
    EndpointLlama2,
    EndpointSdxl,
}

/// Static description of one invocable model.
#[derive(Clone, Copy, Debug)]
pub struct AdapterSpec {
    /// Substring matched (case-insensitively) against requested names/ids.
    pub fragment: &'static str,
    /// Concrete backend model id sent on invocation.
    pub model_id: &'static str,
    /// Human-readable label for logs and menus.
    pub label: &'static str,
    pub kind: AdapterKind,
    pub modality: Modality,
    /// Prompt ceiling in characters; callers truncate before invoking.
    pub char_limit: u32,
}

// ─────────────────────────────────────────────
// Dispatch tables (in priority order)
// ─────────────────────────────────────────────

/// Bedrock-family adapters, first-match-wins.
pub static BEDROCK_ADAPTERS: &[AdapterSpec] = &[
    AdapterSpec {
        fragment: "titan-text-lite",
        model_id: "amazon.titan-text-lite-v1",
        label: "Bedrock Titan Text Lite",
        kind: AdapterKind::TitanText,
        modality: Modality::Text,
        char_limit: 4000,
    },
    AdapterSpec {
        fragment: "titan-text-express",
        model_id: "amazon.titan-text-express-v1",
        label: "Bedrock Titan Text Express",
        kind: AdapterKind::TitanText,
        modality: Modality::Text,
        char_limit: 4000,
    },
    AdapterSpec {
        fragment: "titan-embed",
        model_id: "amazon.titan-embed-text-v1",
        label: "Bedrock Titan Embedding Text",
        kind: AdapterKind::TitanEmbedding,
        modality: Modality::Embedding,
        char_limit: 4000,
    },
    AdapterSpec {
        fragment: "claude-3",
        model_id: "anthropic.claude-3-sonnet-20240229-v1:0",
        label: "Anthropic Claude v3 Sonnet",
        kind: AdapterKind::ClaudeMessages,
        modality: Modality::Text,
        char_limit: 20000,
    },
    AdapterSpec {
        fragment: "claude-v2:1",
        model_id: "anthropic.claude-v2:1",
        label: "Anthropic Claude v2.1",
        kind: AdapterKind::ClaudePrompt,
        modality: Modality::Text,
        char_limit: 15000,
    },
    AdapterSpec {
        fragment: "claude-instant-v1",
        model_id: "anthropic.claude-instant-v1",
        label: "Anthropic Claude Instant v1",
        kind: AdapterKind::ClaudePrompt,
        modality: Modality::Text,
        char_limit: 10000,
    },
    AdapterSpec {
        fragment: "claude-v1-100k",
        model_id: "anthropic.claude-v1-100k",
        label: "Anthropic Claude v1 100K",
        kind: AdapterKind::ClaudePrompt,
        modality: Modality::Text,
        char_limit: 50000,
    },
    AdapterSpec {
        fragment: "claude-v2-100k",
        model_id: "anthropic.claude-v2-100k",
        label: "Anthropic Claude v2 100K",
        kind: AdapterKind::ClaudePrompt,
        modality: Modality::Text,
        char_limit: 50000,
    },
    AdapterSpec {
        fragment: "claude-v1",
        model_id: "anthropic.claude-v1",
        label: "Anthropic Claude v1",
        kind: AdapterKind::ClaudePrompt,
        modality: Modality::Text,
        char_limit: 10000,
    },
    AdapterSpec {
        fragment: "claude-v2",
        model_id: "anthropic.claude-v2",
        label: "Anthropic Claude v2",
        kind: AdapterKind::ClaudePrompt,
        modality: Modality::Text,
        char_limit: 15000,
    },
    AdapterSpec {
        fragment: "j2-ultra",
        model_id: "ai21.j2-ultra",
        label: "AI21 Jurassic2 Ultra",
        kind: AdapterKind::Ai21,
        modality: Modality::Text,
        char_limit: 8000,
    },
    AdapterSpec {
        fragment: "j2-mid",
        model_id: "ai21.j2-mid",
        label: "AI21 Jurassic2 Grande",
        kind: AdapterKind::Ai21,
        modality: Modality::Text,
        char_limit: 8000,
    },
    AdapterSpec {
        fragment: "sdxl",
        model_id: "stability.stable-diffusion-xl-v1",
        label: "StableDiffusion SDXL",
        kind: AdapterKind::Sdxl,
        modality: Modality::Image,
        char_limit: 2000,
    },
    AdapterSpec {
        fragment: "stable-diffusion",
        model_id: "stability.stable-diffusion-xl-v1",
        label: "StableDiffusion SDXL",
        kind: AdapterKind::Sdxl,
        modality: Modality::Image,
        char_limit: 2000,
    },
    AdapterSpec {
        fragment: "llama2-13b-chat",
        model_id: "meta.llama2-13b-chat-v1",
        label: "Meta Llama2-13b-chat",
        kind: AdapterKind::Llama2,
        modality: Modality::Text,
        char_limit: 5000,
    },
    AdapterSpec {
        fragment: "llama2-70b-chat",
        model_id: "meta.llama2-70b-chat-v1",
        label: "Meta Llama2-70b-chat",
        kind: AdapterKind::Llama2,
        modality: Modality::Text,
        char_limit: 5000,
    },
    AdapterSpec {
        fragment: "mistral-7b-instruct",
        model_id: "mistral.mistral-7b-instruct-v0:2",
        label: "Mistral 7B Instruct",
        kind: AdapterKind::Mistral,
        modality: Modality::Text,
        char_limit: 400,
    },
    AdapterSpec {
        fragment: "mistral-8x7b-instruct",
        model_id: "mistral.mistral-8x7b-instruct-v0:1",
        label: "Mistral 8x7B Instruct",
        kind: AdapterKind::Mistral,
        modality: Modality::Text,
        char_limit: 400,
    },
    AdapterSpec {
        fragment: "command-text",
        model_id: "cohere.command-text-v14",
        label: "Cohere Command Text v14",
        kind: AdapterKind::Cohere,
        modality: Modality::Text,
        char_limit: 8000,
    },
];

/// Jumpstart-family adapters (all served by the one named endpoint).
pub static JUMPSTART_ADAPTERS: &[AdapterSpec] = &[
    AdapterSpec {
        fragment: "falcon",
        model_id: "hf-llm-falcon-7b-instruct-bf16",
        label: "Huggingface Falcon",
        kind: AdapterKind::EndpointFalcon,
        modality: Modality::Text,
        char_limit: 10000,
    },
    AdapterSpec {
        fragment: "flan-t5",
        model_id: "flan-t5-xl",
        label: "Flan T5",
        kind: AdapterKind::EndpointFlanT5,
        modality: Modality::Text,
        char_limit: 5000,
    },
    AdapterSpec {
        fragment: "j2-ultra",
        model_id: "ai21.j2-ultra",
        label: "AI21 Jurassic2 Ultra",
        kind: AdapterKind::EndpointAi21,
        modality: Modality::Text,
        char_limit: 5000,
    },
    AdapterSpec {
        fragment: "j2-mid",
        model_id: "ai21.j2-mid",
        label: "AI21 Jurassic2 Grande",
        kind: AdapterKind::EndpointAi21,
        modality: Modality::Text,
        char_limit: 5000,
    },
    AdapterSpec {
        fragment: "llama-2-13b-chat",
        model_id: "llama-2-13b-chat",
        label: "SageMaker Meta Llama-2-13b-chat",
        kind: AdapterKind::EndpointLlama2,
        modality: Modality::Text,
        char_limit: 5000,
    },
    AdapterSpec {
        fragment: "llama-2-70b-chat",
        model_id: "llama-2-70b-chat",
        label: "SageMaker Meta Llama-2-70b-chat",
        kind: AdapterKind::EndpointLlama2,
        modality: Modality::Text,
        char_limit: 5000,
    },
    AdapterSpec {
        fragment: "stable-diffusion",
        model_id: "stable-diffusion",
        label: "StableDiffusion SDXL",
        kind: AdapterKind::EndpointSdxl,
        modality: Modality::Image,
        char_limit: 2000,
    },
];

/// The adapter used when nothing matches a requested name.
pub fn default_adapter() -> &'static AdapterSpec {
    BEDROCK_ADAPTERS
        .iter()
        .find(|s| s.fragment == "claude-v2")
        .expect("claude-v2 entry present in dispatch table")
}

// ─────────────────────────────────────────────
// Matching functions
// ─────────────────────────────────────────────

/// Find a Bedrock adapter by fragment match.
///
/// Never fails: unknown names fall back to the Claude v2 adapter.
pub fn lookup_bedrock(name: &str) -> &'static AdapterSpec {
    let lower = name.to_lowercase();
    if let Some(spec) = BEDROCK_ADAPTERS.iter().find(|s| lower.contains(s.fragment)) {
        return spec;
    }
    warn!(
        model = name,
        "no match for requested model, returning default Claude v2"
    );
    default_adapter()
}

/// Find a Jumpstart adapter by fragment match, if any.
pub fn lookup_jumpstart(name: &str) -> Option<&'static AdapterSpec> {
    let lower = name.to_lowercase();
    JUMPSTART_ADAPTERS.iter().find(|s| lower.contains(s.fragment))
}

// ─────────────────────────────────────────────
// Registry — menu of selectable models
// ─────────────────────────────────────────────

/// Menu name for the Jumpstart entry.
pub const JUMPSTART_MENU_NAME: &str = "Sagemaker Jumpstart";

/// One selectable model: a display name bound to an adapter.
#[derive(Clone, Debug)]
pub struct ModelDescriptor {
    pub display_name: String,
    pub family: Family,
    pub spec: &'static AdapterSpec,
}

impl ModelDescriptor {
    pub fn modality(&self) -> Modality {
        self.spec.modality
    }

    pub fn char_limit(&self) -> u32 {
        self.spec.char_limit
    }
}

/// The model menu: ordered display names, each mapped to a descriptor.
///
/// Display names are unique; every descriptor carries an adapter spec.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    names: Vec<String>,
    entries: HashMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    /// Build the menu from discovery results.
    ///
    /// Vendors exposing at most two text models contribute all of them;
    /// larger vendors are filtered to a curated id set. The Cohere vendor
    /// is skipped. When the Jumpstart family is available, one menu entry
    /// for the named endpoint is appended, bound to the configured model
    /// type (falling back to the first endpoint adapter if the type is
    /// unrecognized, so the entry always has an adapter).
    pub fn from_discovery(
        models: &DiscoveredModels,
        jumpstart_available: bool,
        endpoint_model_type: &str,
    ) -> Self {
        let mut registry = ModelRegistry::default();

        // Deterministic vendor order
        let mut vendors: Vec<&String> = models.text.keys().collect();
        vendors.sort();

        for vendor in vendors {
            if vendor == "Cohere" {
                info!(vendor = %vendor, "not considering vendor for the menu");
                continue;
            }

            let list = &models.text[vendor];
            for summary in list {
                let id = &summary.model_id;
                let (keep, display_name) = if list.len() <= 2 {
                    (true, summary.model_name.clone())
                } else {
                    match vendor.as_str() {
                        "Amazon" => (
                            id.contains("titan-text-lite-v1")
                                || id.contains("titan-text-express-v1"),
                            summary.model_name.clone(),
                        ),
                        "Anthropic" => (
                            id.contains("claude-3")
                                || id.contains("claude-v2:1")
                                || id.contains("claude-instant-v1"),
                            to_display_name(id),
                        ),
                        "Meta" => (
                            id.contains("llama2-13b-chat-v1")
                                || id.contains("llama2-70b-chat-v1"),
                            summary.model_name.clone(),
                        ),
                        "AI21 Labs" => (id.contains("ai21.j2-ultra-v1"), summary.model_name.clone()),
                        _ => {
                            info!(model = %id, "not considering model for the menu");
                            (false, String::new())
                        }
                    }
                };

                if keep {
                    registry.insert(display_name, Family::Bedrock, lookup_bedrock(id));
                }
            }
        }

        if jumpstart_available {
            let spec = lookup_jumpstart(endpoint_model_type).unwrap_or_else(|| {
                warn!(
                    model_type = endpoint_model_type,
                    "unrecognized endpoint model type, defaulting to the first endpoint adapter"
                );
                &JUMPSTART_ADAPTERS[0]
            });
            registry.insert(JUMPSTART_MENU_NAME.to_string(), Family::Jumpstart, spec);
        }

        registry
    }

    fn insert(&mut self, display_name: String, family: Family, spec: &'static AdapterSpec) {
        if display_name.is_empty() || self.entries.contains_key(&display_name) {
            if !display_name.is_empty() {
                warn!(name = %display_name, "duplicate menu name, keeping the first entry");
            }
            return;
        }
        self.names.push(display_name.clone());
        self.entries.insert(
            display_name.clone(),
            ModelDescriptor {
                display_name,
                family,
                spec,
            },
        );
    }

    /// Ordered menu of display names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Exact menu entry, if present.
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.entries.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use modelmux_core::types::ModelSummary;

    fn summary(id: &str, name: &str, vendor: &str) -> ModelSummary {
        ModelSummary {
            model_id: id.to_string(),
            model_name: name.to_string(),
            provider_name: vendor.to_string(),
            output_modalities: vec!["TEXT".to_string()],
            inference_types_supported: vec!["ON_DEMAND".to_string()],
        }
    }

    // ── Ordering invariant ──

    /// First-match-wins only works if no fragment is shadowed by an earlier,
    /// shorter fragment. For every pair, an earlier fragment must not be a
    /// substring of a later one.
    #[test]
    fn test_bedrock_fragment_priority_ordering() {
        for (i, a) in BEDROCK_ADAPTERS.iter().enumerate() {
            for b in BEDROCK_ADAPTERS.iter().skip(i + 1) {
                assert!(
                    !b.fragment.contains(a.fragment),
                    "fragment '{}' is shadowed by earlier fragment '{}'",
                    b.fragment,
                    a.fragment
                );
            }
        }
    }

    #[test]
    fn test_jumpstart_fragment_priority_ordering() {
        for (i, a) in JUMPSTART_ADAPTERS.iter().enumerate() {
            for b in JUMPSTART_ADAPTERS.iter().skip(i + 1) {
                assert!(
                    !b.fragment.contains(a.fragment),
                    "fragment '{}' is shadowed by earlier fragment '{}'",
                    b.fragment,
                    a.fragment
                );
            }
        }
    }

    // ── lookup_bedrock ──

    #[test]
    fn test_lookup_longest_fragment_wins() {
        // claude-v1-100k contains claude-v1; the 100k adapter must win
        let spec = lookup_bedrock("anthropic.claude-v1-100k");
        assert_eq!(spec.model_id, "anthropic.claude-v1-100k");
        assert_eq!(spec.char_limit, 50000);

        let spec = lookup_bedrock("anthropic.claude-v2:1");
        assert_eq!(spec.model_id, "anthropic.claude-v2:1");

        let spec = lookup_bedrock("anthropic.claude-v2-100k");
        assert_eq!(spec.model_id, "anthropic.claude-v2-100k");
    }

    #[test]
    fn test_lookup_plain_variants() {
        assert_eq!(lookup_bedrock("anthropic.claude-v1").model_id, "anthropic.claude-v1");
        assert_eq!(lookup_bedrock("anthropic.claude-v2").model_id, "anthropic.claude-v2");
        assert_eq!(
            lookup_bedrock("anthropic.claude-3-sonnet-20240229-v1:0").kind,
            AdapterKind::ClaudeMessages
        );
        assert_eq!(
            lookup_bedrock("amazon.titan-text-express-v1").model_id,
            "amazon.titan-text-express-v1"
        );
        assert_eq!(
            lookup_bedrock("meta.llama2-70b-chat-v1").model_id,
            "meta.llama2-70b-chat-v1"
        );
        assert_eq!(
            lookup_bedrock("mistral.mistral-8x7b-instruct-v0:1").model_id,
            "mistral.mistral-8x7b-instruct-v0:1"
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(
            lookup_bedrock("Anthropic Claude-V2:1 something").model_id,
            "anthropic.claude-v2:1"
        );
    }

    #[test]
    fn test_lookup_unknown_returns_default() {
        let spec = lookup_bedrock("some-random-model-xyz");
        assert_eq!(spec.model_id, "anthropic.claude-v2");
        assert_eq!(spec.char_limit, 15000);
    }

    // ── lookup_jumpstart ──

    #[test]
    fn test_lookup_jumpstart() {
        assert_eq!(
            lookup_jumpstart("falcon").unwrap().model_id,
            "hf-llm-falcon-7b-instruct-bf16"
        );
        assert_eq!(lookup_jumpstart("flan-t5").unwrap().model_id, "flan-t5-xl");
        assert_eq!(
            lookup_jumpstart("llama-2-70b-chat").unwrap().kind,
            AdapterKind::EndpointLlama2
        );
        assert!(lookup_jumpstart("gpt-j").is_none());
    }

    // ── Menu construction ──

    fn curated_discovery() -> DiscoveredModels {
        let mut models = DiscoveredModels::default();
        models.text.insert(
            "Anthropic".to_string(),
            vec![
                summary("anthropic.claude-v2:1", "Claude", "Anthropic"),
                summary("anthropic.claude-v2", "Claude", "Anthropic"),
                summary("anthropic.claude-instant-v1", "Claude Instant", "Anthropic"),
                summary("anthropic.claude-3-sonnet-20240229-v1:0", "Claude 3 Sonnet", "Anthropic"),
            ],
        );
        models.text.insert(
            "Amazon".to_string(),
            vec![
                summary("amazon.titan-text-lite-v1", "Titan Text G1 - Lite", "Amazon"),
                summary("amazon.titan-text-express-v1", "Titan Text G1 - Express", "Amazon"),
                summary("amazon.titan-tg1-large", "Titan Text Large", "Amazon"),
            ],
        );
        models.text.insert(
            "Mistral AI".to_string(),
            vec![
                summary("mistral.mistral-7b-instruct-v0:2", "Mistral 7B Instruct", "Mistral AI"),
                summary("mistral.mistral-8x7b-instruct-v0:1", "Mixtral 8x7B Instruct", "Mistral AI"),
            ],
        );
        models.text.insert(
            "Cohere".to_string(),
            vec![summary("cohere.command-text-v14", "Command", "Cohere")],
        );
        models
    }

    #[test]
    fn test_menu_curates_large_vendors() {
        let registry = ModelRegistry::from_discovery(&curated_discovery(), false, "");
        let names = registry.names();

        // Anthropic entries use camel-cased ids as display names
        assert!(names.iter().any(|n| n == "Anthropic Claude V2.1"));
        assert!(names.iter().any(|n| n == "Anthropic Claude Instant V1"));
        assert!(names
            .iter()
            .any(|n| n == "Anthropic Claude 3 Sonnet 20240229 V1.0"));
        // Plain claude-v2 is filtered out of the curated set
        assert!(!names.iter().any(|n| n == "Anthropic Claude V2"));

        // Amazon keeps only lite/express, by listing name
        assert!(names.iter().any(|n| n == "Titan Text G1 - Lite"));
        assert!(names.iter().any(|n| n == "Titan Text G1 - Express"));
        assert!(!names.iter().any(|n| n == "Titan Text Large"));
    }

    #[test]
    fn test_menu_keeps_small_vendors_whole() {
        let registry = ModelRegistry::from_discovery(&curated_discovery(), false, "");
        let names = registry.names();
        assert!(names.iter().any(|n| n == "Mistral 7B Instruct"));
        assert!(names.iter().any(|n| n == "Mixtral 8x7B Instruct"));
    }

    #[test]
    fn test_menu_skips_cohere() {
        let registry = ModelRegistry::from_discovery(&curated_discovery(), false, "");
        assert!(!registry.names().iter().any(|n| n == "Command"));
    }

    #[test]
    fn test_menu_appends_jumpstart_entry() {
        let registry = ModelRegistry::from_discovery(&curated_discovery(), true, "falcon");
        let descriptor = registry.get(JUMPSTART_MENU_NAME).unwrap();
        assert_eq!(descriptor.family, Family::Jumpstart);
        assert_eq!(descriptor.spec.kind, AdapterKind::EndpointFalcon);
        // The jumpstart entry is last
        assert_eq!(registry.names().last().unwrap(), JUMPSTART_MENU_NAME);
    }

    #[test]
    fn test_menu_jumpstart_unknown_type_still_has_adapter() {
        let registry = ModelRegistry::from_discovery(&curated_discovery(), true, "mystery-model");
        let descriptor = registry.get(JUMPSTART_MENU_NAME).unwrap();
        // Falls back to the first endpoint adapter rather than a dangling entry
        assert_eq!(descriptor.spec.kind, AdapterKind::EndpointFalcon);
    }

    #[test]
    fn test_menu_names_are_unique() {
        let mut models = curated_discovery();
        // A vendor whose two models share a listing name
        models.text.insert(
            "Meta".to_string(),
            vec![
                summary("meta.llama2-13b-chat-v1", "Llama 2 Chat", "Meta"),
                summary("meta.llama2-70b-chat-v1", "Llama 2 Chat", "Meta"),
            ],
        );
        let registry = ModelRegistry::from_discovery(&models, false, "");

        let dupes = registry
            .names()
            .iter()
            .filter(|n| *n == "Llama 2 Chat")
            .count();
        assert_eq!(dupes, 1);

        // Every entry carries an adapter spec
        for name in registry.names() {
            assert!(registry.get(name).is_some());
        }
    }

    #[test]
    fn test_menu_descriptor_char_limits() {
        let registry = ModelRegistry::from_discovery(&curated_discovery(), false, "");
        let claude = registry.get("Anthropic Claude V2.1").unwrap();
        assert_eq!(claude.char_limit(), 15000);
        let mistral = registry.get("Mistral 7B Instruct").unwrap();
        assert_eq!(mistral.char_limit(), 400);
    }

    #[test]
    fn test_empty_discovery_gives_empty_menu() {
        let registry = ModelRegistry::from_discovery(&DiscoveredModels::default(), false, "");
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
    }
}
