//! Bedrock-family adapters — request/response translation for the
//! on-demand service's vendors.
//!
//! Envelope shapes per vendor:
//! - Titan: `{"inputText", "textGenerationConfig"}` → `results[0].outputText`
//! - Claude (prompt API): `{"prompt", "max_tokens_to_sample"}` → `completion`
//! - Claude (messages API): versioned body → `content[0].text` + exact usage
//! - AI21: camelCase penalties → `completions[0].data.text`
//! - Llama2: `{"prompt", "max_gen_len"}` → `generation`
//! - Mistral: `<s>[INST]...[/INST]` wrapping → `outputs[0].text`
//! - Cohere: `{"prompt", "p"}` → `generations[0].text`
//! - SDXL: `{"text_prompts", ...}` → `artifacts[]`

use serde_json::{json, Value};
use tracing::info;

use modelmux_core::types::{GenerationParams, ImageArtifact, ModelOutput, UsageInfo};
use modelmux_core::utils::truncate_chars;

use crate::backend::BackendError;
use crate::cost::UsageBasis;

use super::{field_str, field_u64, parse_json, strip_quotes, AdapterContext, AdapterOutput};

pub(super) async fn titan_text(
    ctx: &AdapterContext<'_>,
    model_id: &str,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    // Literal newlines corrupt this backend's request encoding
    let prompt = truncate_chars(&prompt.replace('\n', " "), ctx.titan_payload_limit);

    let body = json!({
        "inputText": &prompt,
        "textGenerationConfig": {
            "maxTokenCount": params.max_tokens.unwrap_or(4096),
            "topP": params.top_p.unwrap_or(0.9),
            "stopSequences": params.stop_sequences,
            "temperature": params.temperature.unwrap_or(0.5),
        }
    });

    info!(model = model_id, "invoking Titan text");
    let raw = ctx.service.invoke_model(model_id, body).await?;
    let value = parse_json(&raw)?;
    let text = field_str(&value, "/results/0/outputText")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(strip_quotes(text)),
        usage: UsageBasis::Estimated {
            input_bytes: prompt.len(),
            output_bytes: raw.len(),
        },
    })
}

pub(super) async fn titan_embedding(
    ctx: &AdapterContext<'_>,
    model_id: &str,
    prompt: &str,
) -> Result<AdapterOutput, BackendError> {
    let prompt = truncate_chars(&prompt.replace('\n', " "), ctx.titan_payload_limit);

    info!(model = model_id, "invoking Titan embedding");
    let raw = ctx
        .service
        .invoke_model(model_id, json!({"inputText": prompt}))
        .await?;
    let value = parse_json(&raw)?;
    let embedding = value
        .pointer("/embedding")
        .and_then(Value::as_array)
        .ok_or_else(|| BackendError::Envelope("missing field /embedding".to_string()))?
        .iter()
        .filter_map(Value::as_f64)
        .collect();

    Ok(AdapterOutput {
        output: ModelOutput::Embedding(embedding),
        usage: UsageBasis::NotMetered,
    })
}

pub(super) async fn claude_prompt(
    ctx: &AdapterContext<'_>,
    model_id: &str,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    let built = format!("\n\nHuman: {prompt}\n\nAssistant:");
    let body = json!({
        "prompt": &built,
        "max_tokens_to_sample": params.max_tokens.unwrap_or(2048),
    });

    info!(model = model_id, "invoking Claude (prompt API)");
    let raw = ctx.service.invoke_model(model_id, body).await?;
    let value = parse_json(&raw)?;
    let text = field_str(&value, "/completion")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(text.to_string()),
        usage: UsageBasis::Estimated {
            input_bytes: built.len(),
            output_bytes: raw.len(),
        },
    })
}

pub(super) async fn claude_messages(
    ctx: &AdapterContext<'_>,
    model_id: &str,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    let body = json!({
        "anthropic_version": "bedrock-2023-05-31",
        "max_tokens": params.max_tokens.unwrap_or(8096),
        "messages": [
            {
                "role": "user",
                "content": [{"type": "text", "text": prompt}],
            }
        ],
    });

    info!(model = model_id, "invoking Claude (messages API)");
    let raw = ctx.service.invoke_model(model_id, body).await?;
    let value = parse_json(&raw)?;
    let input_tokens = field_u64(&value, "/usage/input_tokens")? as u32;
    let output_tokens = field_u64(&value, "/usage/output_tokens")? as u32;
    let text = field_str(&value, "/content/0/text")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(text.to_string()),
        usage: UsageBasis::Reported(UsageInfo {
            input_tokens,
            output_tokens,
        }),
    })
}

pub(super) async fn ai21(
    ctx: &AdapterContext<'_>,
    model_id: &str,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    // Newlines and tabs break this backend
    let prompt = prompt.replace('\n', " ").replace('\t', " ");

    let body = json!({
        "prompt": &prompt,
        "maxTokens": params.max_tokens.unwrap_or(500),
        "temperature": params.temperature.unwrap_or(1.0),
        "topP": params.top_p.unwrap_or(1.0),
        "stopSequences": params.stop_sequences,
        "countPenalty": {"scale": 0},
        "presencePenalty": {"scale": 0},
        "frequencyPenalty": {"scale": 0},
    });

    info!(model = model_id, "invoking AI21 Jurassic2");
    let raw = ctx.service.invoke_model(model_id, body).await?;
    let value = parse_json(&raw)?;
    let text = field_str(&value, "/completions/0/data/text")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(text.to_string()),
        usage: UsageBasis::Estimated {
            input_bytes: prompt.len(),
            output_bytes: raw.len(),
        },
    })
}

pub(super) async fn llama2(
    ctx: &AdapterContext<'_>,
    model_id: &str,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    let body = json!({
        "prompt": prompt,
        "max_gen_len": params.max_tokens.unwrap_or(2000),
        "top_p": params.top_p.unwrap_or(0.9),
        "temperature": params.temperature.unwrap_or(0.6),
    });

    info!(model = model_id, "invoking Llama2");
    let raw = ctx.service.invoke_model(model_id, body).await?;
    let value = parse_json(&raw)?;
    let text = field_str(&value, "/generation")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(text.to_string()),
        usage: UsageBasis::Estimated {
            input_bytes: prompt.len(),
            output_bytes: raw.len(),
        },
    })
}

pub(super) async fn mistral(
    ctx: &AdapterContext<'_>,
    model_id: &str,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    let body = json!({
        "prompt": format!("<s>[INST]{prompt}.[/INST]"),
        "max_tokens": params.max_tokens.unwrap_or(500),
        "top_k": params.top_k.unwrap_or(50),
        "top_p": params.top_p.unwrap_or(0.7),
        "temperature": params.temperature.unwrap_or(0.7),
    });

    info!(model = model_id, "invoking Mistral");
    let raw = ctx.service.invoke_model(model_id, body).await?;
    let value = parse_json(&raw)?;
    let text = field_str(&value, "/outputs/0/text")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(text.to_string()),
        usage: UsageBasis::Estimated {
            input_bytes: prompt.len(),
            output_bytes: raw.len(),
        },
    })
}

pub(super) async fn cohere(
    ctx: &AdapterContext<'_>,
    model_id: &str,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    let body = json!({
        "prompt": prompt,
        "max_tokens": params.max_tokens.unwrap_or(1024),
        "temperature": params.temperature.unwrap_or(0.5),
        "p": params.top_p.unwrap_or(1.0),
    });

    info!(model = model_id, "invoking Cohere text");
    let raw = ctx.service.invoke_model(model_id, body).await?;
    let value = parse_json(&raw)?;
    let text = field_str(&value, "/generations/0/text")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(text.to_string()),
        usage: UsageBasis::Estimated {
            input_bytes: prompt.len(),
            output_bytes: raw.len(),
        },
    })
}

pub(super) async fn sdxl(
    ctx: &AdapterContext<'_>,
    model_id: &str,
    prompt: &str,
) -> Result<AdapterOutput, BackendError> {
    let body = sdxl_body(prompt);

    info!(model = model_id, "invoking stable-diffusion");
    let raw = ctx.service.invoke_model(model_id, body).await?;
    parse_artifacts(&raw)
}

/// Shared SDXL request body (both families take the same shape).
pub(super) fn sdxl_body(prompt: &str) -> Value {
    json!({
        "text_prompts": [{"text": prompt}],
        "cfg_scale": 10,
        "height": 512,
        "width": 512,
        "image_strength": 0.5,
        "style_preset": "digital-art",
        "seed": 1885337276i64,
        "steps": 100,
    })
}

/// Parse a diffusion response into an artifact list.
pub(super) fn parse_artifacts(raw: &str) -> Result<AdapterOutput, BackendError> {
    let value = parse_json(raw)?;
    let artifacts = value
        .pointer("/artifacts")
        .cloned()
        .ok_or_else(|| BackendError::Envelope("missing field /artifacts".to_string()))?;
    let artifacts: Vec<ImageArtifact> = serde_json::from_value(artifacts)
        .map_err(|e| BackendError::Envelope(e.to_string()))?;

    Ok(AdapterOutput {
        output: ModelOutput::Image(artifacts),
        usage: UsageBasis::NotMetered,
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
