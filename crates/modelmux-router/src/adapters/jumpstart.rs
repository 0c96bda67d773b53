//! Jumpstart-family adapters — all models served by the one named endpoint.
//!
//! These backends echo different envelope shapes than the on-demand
//! service: generation results come back as a JSON array, and models
//! configured with `return_full_text` echo the prompt back at the start of
//! the generated text, which gets stripped here.

use serde_json::json;
use tracing::info;

use modelmux_core::types::{GenerationParams, ModelOutput};

use crate::backend::BackendError;
use crate::cost::UsageBasis;

use super::{field_str, parse_json, strip_quotes, AdapterContext, AdapterOutput};

pub(super) async fn falcon(
    ctx: &AdapterContext<'_>,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    let body = json!({
        "inputs": prompt,
        "parameters": {
            "max_new_tokens": params.max_tokens.unwrap_or(1024),
            "return_full_text": true,
            "do_sample": true,
            "temperature": params.temperature.unwrap_or(0.5),
            "repetition_penalty": 1.03,
            "top_p": params.top_p.unwrap_or(0.9),
            "top_k": params.top_k.unwrap_or(1),
            "stop": ["<|endoftext|>", "</s>"],
        }
    });

    info!(endpoint = ctx.endpoint_name, "invoking HuggingFace Falcon");
    let raw = ctx.endpoint.invoke_endpoint(ctx.endpoint_name, body).await?;
    let value = parse_json(&raw)?;
    let text = field_str(&value, "/0/generated_text")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(strip_echoed_prompt(text, prompt)),
        usage: UsageBasis::NotMetered,
    })
}

pub(super) async fn flan_t5(
    ctx: &AdapterContext<'_>,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    let body = json!({
        "text_inputs": prompt,
        "parameters": {
            "max_length": params.max_tokens.unwrap_or(512),
            "top_k": params.top_k.unwrap_or(1),
        }
    });

    info!(endpoint = ctx.endpoint_name, "invoking Flan T5");
    let raw = ctx.endpoint.invoke_endpoint(ctx.endpoint_name, body).await?;
    let value = parse_json(&raw)?;
    let text = field_str(&value, "/0/generated_text")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(strip_echoed_prompt(text, prompt)),
        usage: UsageBasis::NotMetered,
    })
}

pub(super) async fn ai21(
    ctx: &AdapterContext<'_>,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    let body = json!({
        "prompt": prompt,
        "maxTokens": params.max_tokens.unwrap_or(500),
        "temperature": params.temperature.unwrap_or(1.0),
        "numResults": 1,
        "topP": params.top_p.unwrap_or(1.0),
        "topKReturn": 0,
        "stopSequences": ["##"],
    });

    info!(endpoint = ctx.endpoint_name, "invoking AI21 Jurassic2");
    let raw = ctx.endpoint.invoke_endpoint(ctx.endpoint_name, body).await?;
    let value = parse_json(&raw)?;
    let text = field_str(&value, "/completions/0/data/text")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(text.to_string()),
        usage: UsageBasis::NotMetered,
    })
}

pub(super) async fn llama2(
    ctx: &AdapterContext<'_>,
    prompt: &str,
    params: &GenerationParams,
) -> Result<AdapterOutput, BackendError> {
    let qa_prompt = format!("Question: {prompt}\nAnswer:");
    let body = json!({
        "inputs": [[{"role": "user", "content": qa_prompt}]],
        "parameters": {
            "max_new_tokens": params.max_tokens.unwrap_or(512),
            "top_p": params.top_p.unwrap_or(0.9),
            "temperature": params.temperature.unwrap_or(0.6),
        }
    });

    info!(endpoint = ctx.endpoint_name, "invoking Llama-2");
    let raw = ctx.endpoint.invoke_endpoint(ctx.endpoint_name, body).await?;
    let value = parse_json(&raw)?;
    let text = field_str(&value, "/0/generated_text")?;

    Ok(AdapterOutput {
        output: ModelOutput::Text(strip_quotes(text)),
        usage: UsageBasis::NotMetered,
    })
}

pub(super) async fn sdxl(
    ctx: &AdapterContext<'_>,
    prompt: &str,
) -> Result<AdapterOutput, BackendError> {
    let body = super::bedrock::sdxl_body(prompt);

    info!(endpoint = ctx.endpoint_name, "invoking stable-diffusion");
    let raw = ctx.endpoint.invoke_endpoint(ctx.endpoint_name, body).await?;
    super::bedrock::parse_artifacts(&raw)
}

/// Remove the echoed prompt prefix from full-text responses.
fn strip_echoed_prompt(text: &str, prompt: &str) -> String {
    text.strip_prefix(prompt).unwrap_or(text).to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
