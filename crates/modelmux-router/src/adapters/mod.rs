//! Invocation adapters — one translation unit per model family/vendor.
//!
//! Every adapter implements the same contract: build the vendor-specific
//! request body, call the backend, parse the vendor-specific response
//! envelope, strip incidental quoting artifacts, and report a usage basis
//! for cost metering. Backend failures come back as classified
//! [`BackendError`]s; adapters never panic on them.

mod bedrock;
mod jumpstart;

use serde_json::Value;

use modelmux_core::types::{GenerationParams, ModelOutput};

use crate::backend::{BackendError, EndpointBackend, ServiceBackend};
use crate::cost::UsageBasis;
use crate::registry::{AdapterKind, AdapterSpec};

// ─────────────────────────────────────────────
// Contract types
// ─────────────────────────────────────────────

/// Everything an adapter needs to reach its backend.
pub struct AdapterContext<'a> {
    pub service: &'a dyn ServiceBackend,
    pub endpoint: &'a dyn EndpointBackend,
    /// Name of the Jumpstart endpoint (empty when the family is unavailable).
    pub endpoint_name: &'a str,
    /// Payload ceiling for the Titan-family text backend.
    pub titan_payload_limit: usize,
}

/// A successful invocation: the output plus what to bill it on.
#[derive(Debug)]
pub struct AdapterOutput {
    pub output: ModelOutput,
    pub usage: UsageBasis,
}

/// Run the adapter described by `spec`.
pub async fn invoke(
    spec: &AdapterSpec,
    ctx: &AdapterContext<'_>,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    match spec.kind {
        AdapterKind::TitanText => bedrock::titan_text(ctx, spec.model_id, prompt, params).await,
        AdapterKind::TitanEmbedding => bedrock::titan_embedding(ctx, spec.model_id, prompt).await,
        AdapterKind::ClaudeMessages => {
            bedrock::claude_messages(ctx, spec.model_id, prompt, params).await
        }
        AdapterKind::ClaudePrompt => {
            bedrock::claude_prompt(ctx, spec.model_id, prompt, params).await
        }
        AdapterKind::Ai21 => bedrock::ai21(ctx, spec.model_id, prompt, params).await,
        AdapterKind::Llama2 => bedrock::llama2(ctx, spec.model_id, prompt, params).await,
        AdapterKind::Mistral => bedrock::mistral(ctx, spec.model_id, prompt, params).await,
        AdapterKind::Cohere => bedrock::cohere(ctx, spec.model_id, prompt, params).await,
        AdapterKind::Sdxl => bedrock::sdxl(ctx, spec.model_id, prompt).await,
        AdapterKind::EndpointFalcon => jumpstart::falcon(ctx, prompt, params).await,
        AdapterKind::EndpointFlanT5 => jumpstart::flan_t5(ctx, prompt, params).await,
        AdapterKind::EndpointAi21 => jumpstart::ai21(ctx, prompt, params).await,
        AdapterKind::EndpointLlama2 => jumpstart::llama2(ctx, prompt, params).await,
        AdapterKind::EndpointSdxl => jumpstart::sdxl(ctx, prompt).await,
    }
}

// ─────────────────────────────────────────────
// Shared parsing helpers
// ─────────────────────────────────────────────

pub(crate) fn parse_json(raw: &str) -> Result<Value, BackendError> {
    serde_json::from_str(raw).map_err(|e| BackendError::Envelope(e.to_string()))
}

/// Extract a string field via JSON pointer, or fail with an envelope error.
pub(crate) fn field_str<'v>(value: &'v Value, pointer: &str) -> Result<&'v str, BackendError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::Envelope(format!("missing field {pointer}")))
}

/// Extract an unsigned integer field via JSON pointer.
pub(crate) fn field_u64(value: &Value, pointer: &str) -> Result<u64, BackendError> {
    value
        .pointer(pointer)
        .and_then(Value::as_u64)
        .ok_or_else(|| BackendError::Envelope(format!("missing field {pointer}")))
}

/// Strip the surrounding quotes some backends wrap generated text in.
/// Leaving them in corrupts follow-up calls that echo the text back.
pub(crate) fn strip_quotes(text: &str) -> String {
    text.trim_matches('"').to_string()
}
