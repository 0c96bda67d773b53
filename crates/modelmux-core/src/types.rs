//! Shared types for model discovery and invocation.
//!
//! The wire format for model listings follows the managed service's JSON
//! (camelCase keys); everything else is internal and plain Rust.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────
// Provider family
// ─────────────────────────────────────────────

/// The two ways of reaching a hosted model: the fully-managed on-demand
/// API (Bedrock) or a self-managed named inference endpoint (Jumpstart).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Bedrock,
    Jumpstart,
}

impl Family {
    /// Parse a family name from config, case-insensitive.
    /// Unrecognized values fall back to Bedrock (the default preference).
    pub fn from_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "jumpstart" | "sagemaker" | "endpoint" => Family::Jumpstart,
            _ => Family::Bedrock,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Bedrock => write!(f, "Bedrock"),
            Family::Jumpstart => write!(f, "Jumpstart"),
        }
    }
}

// ─────────────────────────────────────────────
// Modality
// ─────────────────────────────────────────────

/// Output modality of a model, as reported by the model listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modality {
    Text,
    Image,
    Embedding,
}

impl Modality {
    /// Parse the listing's modality string (`"TEXT"`, `"IMAGE"`, `"EMBEDDING"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TEXT" => Some(Modality::Text),
            "IMAGE" => Some(Modality::Image),
            "EMBEDDING" => Some(Modality::Embedding),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────
// Model summary (one row of the list-models call)
// ─────────────────────────────────────────────

/// A model as described by the managed service's "list models" call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    /// Provider-qualified model id, e.g. `"anthropic.claude-v2:1"`.
    pub model_id: String,
    /// Human-readable model name from the listing.
    #[serde(default)]
    pub model_name: String,
    /// Vendor name, e.g. `"Anthropic"`, `"Amazon"`, `"AI21 Labs"`.
    pub provider_name: String,
    /// Output modalities, e.g. `["TEXT"]`.
    #[serde(default)]
    pub output_modalities: Vec<String>,
    /// Supported inference types, e.g. `["ON_DEMAND", "PROVISIONED"]`.
    #[serde(default)]
    pub inference_types_supported: Vec<String>,
}

impl ModelSummary {
    /// The model's primary output modality (first entry of the listing).
    pub fn modality(&self) -> Option<Modality> {
        self.output_modalities.first().and_then(|m| Modality::parse(m))
    }

    /// Whether the model can be invoked on demand (no provisioned capacity).
    pub fn supports_on_demand(&self) -> bool {
        self.inference_types_supported
            .iter()
            .any(|t| t == "ON_DEMAND")
    }
}

// ─────────────────────────────────────────────
// Generation parameters
// ─────────────────────────────────────────────

/// Optional generation parameters for an invocation.
///
/// Each adapter uses the subset its backend supports and defaults the rest.
#[derive(Clone, Debug, Default)]
pub struct GenerationParams {
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Nucleus sampling cutoff.
    pub top_p: Option<f64>,
    /// Top-k sampling cutoff.
    pub top_k: Option<u32>,
    /// Stop sequences.
    pub stop_sequences: Vec<String>,
}

// ─────────────────────────────────────────────
// Invocation output
// ─────────────────────────────────────────────

/// The payload produced by a successful invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelOutput {
    /// Generated text.
    Text(String),
    /// Embedding vector.
    Embedding(Vec<f64>),
    /// Image artifacts (base64 payloads; callers decode).
    Image(Vec<ImageArtifact>),
}

impl ModelOutput {
    /// The text content, or a short placeholder for non-text outputs.
    pub fn into_text(self) -> String {
        match self {
            ModelOutput::Text(t) => t,
            ModelOutput::Embedding(v) => format!("[embedding: {} dimensions]", v.len()),
            ModelOutput::Image(a) => format!("[{} image artifact(s)]", a.len()),
        }
    }
}

/// One generated image, as returned by the diffusion backends.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ImageArtifact {
    /// Base64-encoded image bytes.
    pub base64: String,
    /// Seed used for generation, when the backend reports one.
    #[serde(default)]
    pub seed: Option<i64>,
    /// Backend finish reason, when reported.
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

// ─────────────────────────────────────────────
// Usage
// ─────────────────────────────────────────────

/// Exact token usage reported by a backend (the messages-style API).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
