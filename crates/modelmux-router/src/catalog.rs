//! Provider catalog — one-shot availability probes for both families.
//!
//! Probing happens at most once per catalog (and the catalog lives for the
//! process): the first call to [`ProviderCatalog::availability`] runs both
//! probes, every later call returns the memoized result. There is no
//! re-probe or invalidation — availability is fixed for the process
//! lifetime. Tests inject fake backends instead of resetting state.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use modelmux_core::types::{Modality, ModelSummary};

use crate::backend::{BackendError, EndpointBackend, ServiceBackend};

// ─────────────────────────────────────────────
// Discovery results
// ─────────────────────────────────────────────

/// Discovered on-demand models, grouped by vendor, one map per modality.
#[derive(Clone, Debug, Default)]
pub struct DiscoveredModels {
    pub text: HashMap<String, Vec<ModelSummary>>,
    pub image: HashMap<String, Vec<ModelSummary>>,
    pub embedding: HashMap<String, Vec<ModelSummary>>,
}

/// Reachability of both families plus the raw discovery maps.
///
/// Computed once at process start; read-only afterward.
#[derive(Clone, Debug, Default)]
pub struct ProviderAvailability {
    pub bedrock: bool,
    pub jumpstart: bool,
    pub models: DiscoveredModels,
}

// ─────────────────────────────────────────────
// ProviderCatalog
// ─────────────────────────────────────────────

/// Probes the two provider families and memoizes the result.
pub struct ProviderCatalog {
    service: Arc<dyn ServiceBackend>,
    endpoint: Arc<dyn EndpointBackend>,
    /// Configured endpoint name; `None` means the Jumpstart family is not
    /// configured at all.
    endpoint_name: Option<String>,
    probed: OnceCell<ProviderAvailability>,
}

impl ProviderCatalog {
    /// Create a catalog over the given backends.
    ///
    /// An empty endpoint name is treated the same as no endpoint.
    pub fn new(
        service: Arc<dyn ServiceBackend>,
        endpoint: Arc<dyn EndpointBackend>,
        endpoint_name: Option<String>,
    ) -> Self {
        let endpoint_name = endpoint_name.filter(|n| !n.is_empty() && n.as_str() != "None");
        Self {
            service,
            endpoint,
            endpoint_name,
            probed: OnceCell::new(),
        }
    }

    /// The probed availability. Probes on first call, memoized afterward.
    pub async fn availability(&self) -> &ProviderAvailability {
        self.probed
            .get_or_init(|| async {
                let (bedrock, models) = self.probe_service().await;
                let jumpstart = self.probe_endpoint().await;
                info!(bedrock, jumpstart, "provider availability probed");
                ProviderAvailability {
                    bedrock,
                    jumpstart,
                    models,
                }
            })
            .await
    }

    /// Probe the on-demand service by listing its models.
    ///
    /// Any client error is a soft failure: the family is recorded as
    /// unavailable and the maps stay empty.
    async fn probe_service(&self) -> (bool, DiscoveredModels) {
        let summaries = match self.service.list_models().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "model service unreachable");
                return (false, DiscoveredModels::default());
            }
        };

        let mut models = DiscoveredModels::default();
        for summary in summaries {
            // Only on-demand models are usable without provisioned capacity
            if !summary.supports_on_demand() {
                continue;
            }
            let map = match summary.modality() {
                Some(Modality::Text) => &mut models.text,
                Some(Modality::Image) => &mut models.image,
                Some(Modality::Embedding) => &mut models.embedding,
                None => {
                    debug!(model = %summary.model_id, "skipping model with unknown modality");
                    continue;
                }
            };
            map.entry(summary.provider_name.clone())
                .or_default()
                .push(summary);
        }

        (true, models)
    }

    /// Probe the named endpoint with a minimal synthetic invocation.
    async fn probe_endpoint(&self) -> bool {
        let name = match &self.endpoint_name {
            Some(n) => n,
            None => {
                warn!("endpoint not defined, detection failed");
                return false;
            }
        };

        match self
            .endpoint
            .invoke_endpoint(name, json!({"inputs": "Test data"}))
            .await
        {
            Ok(_) => true,
            Err(BackendError::NotFound(msg)) if endpoint_error_implies_deployed(&msg) => {
                info!("ignoring probe error, it indicates the endpoint is set up");
                true
            }
            Err(e) => {
                warn!(endpoint = %name, error = %e, "endpoint probe failed");
                false
            }
        }
    }
}

/// Whether a not-found probe error actually means the endpoint exists and
/// only the smoke-test payload was rejected.
///
/// TODO: replace with a structured describe-endpoint call; matching on the
/// log-group path in the error message is a placeholder.
fn endpoint_error_implies_deployed(msg: &str) -> bool {
    msg.contains("/aws/sagemaker/Endpoints")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
