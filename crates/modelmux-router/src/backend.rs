//! HTTP clients for the two model backends.
//!
//! Two seams, one per provider family:
//!
//! - [`ServiceBackend`] — the fully-managed on-demand API: a "list models"
//!   call plus a per-model invoke call.
//! - [`EndpointBackend`] — a self-managed named inference endpoint with a
//!   single invocations call.
//!
//! Both return the raw response body as a `String`; adapters own the
//! vendor-specific envelope parsing. Request signing is assumed to happen
//! upstream (a proxy or sidecar); the clients send an optional bearer key.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use modelmux_core::config::BackendConfig;
use modelmux_core::types::ModelSummary;

/// Custom attribute header sent on endpoint invocations.
const ENDPOINT_CUSTOM_ATTRIBUTES: &str = "accept_eula=true";

// ─────────────────────────────────────────────
// Error taxonomy
// ─────────────────────────────────────────────

/// A classified backend failure.
///
/// `Throttled`, `Validation`, and `AccessDenied` are recoverable — callers
/// surface them as messages, never as panics or propagated errors.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request throttled: {0}")]
    Throttled(String),
    #[error("request rejected by backend validation: {0}")]
    Validation(String),
    #[error("model access denied: {0}")]
    AccessDenied(String),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("backend returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    Envelope(String),
}

impl BackendError {
    /// Classify an HTTP failure from its status code and body text.
    ///
    /// The body markers mirror the service's error codes
    /// (`ThrottlingException`, `ValidationException`, ...).
    pub fn classify(status: u16, body: String) -> Self {
        if status == 429 || body.contains("Throttling") {
            BackendError::Throttled(body)
        } else if body.contains("ValidationException") {
            BackendError::Validation(body)
        } else if body.contains("AccessDeniedException") || status == 403 {
            BackendError::AccessDenied(body)
        } else if body.contains("ResourceNotFoundException") || status == 404 {
            BackendError::NotFound(body)
        } else {
            BackendError::Http {
                status,
                message: body,
            }
        }
    }
}

// ─────────────────────────────────────────────
// Traits
// ─────────────────────────────────────────────

/// The fully-managed on-demand model service.
#[async_trait]
pub trait ServiceBackend: Send + Sync {
    /// List the models the service exposes in this account/region.
    async fn list_models(&self) -> Result<Vec<ModelSummary>, BackendError>;

    /// Invoke a model by id with an opaque JSON body; returns the raw
    /// response body.
    async fn invoke_model(&self, model_id: &str, body: Value) -> Result<String, BackendError>;
}

/// A self-managed named inference endpoint.
#[async_trait]
pub trait EndpointBackend: Send + Sync {
    /// Invoke the named endpoint with an opaque JSON body; returns the raw
    /// response body.
    async fn invoke_endpoint(
        &self,
        endpoint_name: &str,
        body: Value,
    ) -> Result<String, BackendError>;
}

// ─────────────────────────────────────────────
// HTTP implementations
// ─────────────────────────────────────────────

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .expect("Failed to build HTTP client")
}

/// HTTP client for the on-demand model service.
pub struct HttpServiceBackend {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl HttpServiceBackend {
    /// Create a client from config; the base URL defaults to the regional
    /// service URL.
    pub fn new(config: &BackendConfig, region: &str) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| format!("https://bedrock.{region}.amazonaws.com"));

        Self {
            client: build_client(),
            api_base,
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ServiceBackend for HttpServiceBackend {
    async fn list_models(&self) -> Result<Vec<ModelSummary>, BackendError> {
        let url = self.url("foundation-models");
        debug!(url = %url, "listing foundation models");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!(status = %status, body = %body, "list models failed");
            return Err(BackendError::classify(status.as_u16(), body));
        }

        let envelope: Value = serde_json::from_str(&body)
            .map_err(|e| BackendError::Envelope(e.to_string()))?;
        let summaries = envelope
            .get("modelSummaries")
            .and_then(Value::as_array)
            .ok_or_else(|| BackendError::Envelope("missing modelSummaries".to_string()))?;

        let mut models = Vec::with_capacity(summaries.len());
        for summary in summaries {
            match serde_json::from_value::<ModelSummary>(summary.clone()) {
                Ok(m) => models.push(m),
                Err(e) => debug!(error = %e, "skipping malformed model summary"),
            }
        }
        Ok(models)
    }

    async fn invoke_model(&self, model_id: &str, body: Value) -> Result<String, BackendError> {
        let url = self.url(&format!("model/{model_id}/invoke"));
        debug!(model = model_id, "invoking model");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!(model = model_id, status = %status, body = %text, "invoke failed");
            return Err(BackendError::classify(status.as_u16(), text));
        }
        Ok(text)
    }
}

/// HTTP client for named inference endpoints.
pub struct HttpEndpointBackend {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl HttpEndpointBackend {
    /// Create a client from config; the base URL defaults to the regional
    /// endpoint-runtime URL.
    pub fn new(config: &BackendConfig, region: &str) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| format!("https://runtime.sagemaker.{region}.amazonaws.com"));

        Self {
            client: build_client(),
            api_base,
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl EndpointBackend for HttpEndpointBackend {
    async fn invoke_endpoint(
        &self,
        endpoint_name: &str,
        body: Value,
    ) -> Result<String, BackendError> {
        let url = format!(
            "{}/endpoints/{}/invocations",
            self.api_base.trim_end_matches('/'),
            endpoint_name
        );
        debug!(endpoint = endpoint_name, "invoking endpoint");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header(
                "X-Amzn-SageMaker-Custom-Attributes",
                ENDPOINT_CUSTOM_ATTRIBUTES,
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!(endpoint = endpoint_name, status = %status, body = %text, "endpoint invoke failed");
            return Err(BackendError::classify(status.as_u16(), text));
        }
        Ok(text)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
