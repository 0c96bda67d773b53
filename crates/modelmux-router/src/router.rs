//! The router facade — what UI collaborators talk to.
//!
//! Construction probes both families once, builds the model menu, and
//! resolves the default model. At request time, a model name is resolved
//! to an adapter, the adapter runs, and usage is fed to the session cost
//! meter.
//!
//! Error contract: recoverable backend failures (throttling, validation,
//! access denial, unclassified) come back as ordinary message strings so
//! callers can render them uninterrupted. The single fatal condition is
//! having no backend at all.

use std::path::Path;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::{info, warn};

use modelmux_core::config::Config;
use modelmux_core::types::{Family, GenerationParams, ModelOutput};

use crate::adapters::{self, AdapterContext};
use crate::backend::{
    BackendError, EndpointBackend, HttpEndpointBackend, HttpServiceBackend, ServiceBackend,
};
use crate::catalog::{ProviderAvailability, ProviderCatalog};
use crate::cost::{CostMeter, PricingTable};
use crate::registry::{default_adapter, lookup_bedrock, lookup_jumpstart, ModelDescriptor, ModelRegistry};
use crate::resolver::{resolve_family, ResolvedFamily};

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Fatal routing failures. Everything recoverable is returned as text.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no model backend available: endpoint not deployed and model service unreachable")]
    NoBackendAvailable,
    #[error("unable to find a matching model for '{0}'")]
    NoMatchingModel(String),
}

// ─────────────────────────────────────────────
// ModelRouter
// ─────────────────────────────────────────────

/// Routes invocations to whichever family/model backs a given name.
///
/// One router per user session: the cost meter inside is session state.
pub struct ModelRouter {
    service: Arc<dyn ServiceBackend>,
    endpoint: Arc<dyn EndpointBackend>,
    endpoint_name: String,
    titan_payload_limit: usize,
    availability: ProviderAvailability,
    registry: ModelRegistry,
    resolved: ResolvedFamily,
    default_model: Option<String>,
    meter: RwLock<CostMeter>,
}

impl ModelRouter {
    /// Build a router over the real HTTP backends described by `config`.
    pub async fn connect(config: &Config) -> Self {
        let service = Arc::new(HttpServiceBackend::new(&config.bedrock, &config.router.region));
        let endpoint = Arc::new(HttpEndpointBackend::new(
            &config.sagemaker,
            &config.router.region,
        ));
        let pricing = PricingTable::load(Path::new(&config.pricing.path), &config.router.region);
        Self::with_backends(config, service, endpoint, pricing).await
    }

    /// Build a router over injected backends (the test seam).
    pub async fn with_backends(
        config: &Config,
        service: Arc<dyn ServiceBackend>,
        endpoint: Arc<dyn EndpointBackend>,
        pricing: PricingTable,
    ) -> Self {
        let catalog = ProviderCatalog::new(
            service.clone(),
            endpoint.clone(),
            Some(config.endpoint.name.clone()),
        );
        let availability = catalog.availability().await.clone();

        let registry = ModelRegistry::from_discovery(
            &availability.models,
            availability.jumpstart,
            &config.endpoint.preferred_model_type,
        );
        let resolved = resolve_family(
            availability.bedrock,
            availability.jumpstart,
            Family::from_config(&config.router.preferred_family),
        );
        let default_model = pick_default_model(registry.names(), &config.router.default_model);
        info!(default = ?default_model, models = registry.names().len(), "router ready");

        Self {
            service,
            endpoint,
            endpoint_name: config.endpoint.name.clone(),
            titan_payload_limit: config.router.titan_payload_limit,
            availability,
            registry,
            resolved,
            default_model,
            meter: RwLock::new(CostMeter::new(pricing)),
        }
    }

    /// Ordered menu of selectable model names.
    pub fn model_names(&self) -> &[String] {
        self.registry.names()
    }

    /// The probed availability snapshot.
    pub fn availability(&self) -> &ProviderAvailability {
        &self.availability
    }

    /// Which family backs the default model.
    pub fn resolved_family(&self) -> ResolvedFamily {
        self.resolved
    }

    /// The resolved default model name.
    pub fn default_model_name(&self) -> Result<&str, RouterError> {
        if self.resolved == ResolvedFamily::Unavailable {
            return Err(RouterError::NoBackendAvailable);
        }
        self.default_model
            .as_deref()
            .ok_or_else(|| RouterError::NoMatchingModel("no models discovered".to_string()))
    }

    /// Prompt ceiling for a model name; callers truncate before invoking.
    pub fn char_limit(&self, model_name: &str) -> u32 {
        match self.resolve(model_name) {
            Ok(descriptor) => descriptor.char_limit(),
            Err(_) => default_adapter().char_limit,
        }
    }

    /// Invoke a model by name.
    ///
    /// Recoverable backend failures come back as `Ok(ModelOutput::Text(msg))`
    /// and are not costed; only the no-backend/no-match conditions are `Err`.
    pub async fn invoke(
        &self,
        model_name: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ModelOutput, RouterError> {
        let descriptor = self.resolve(model_name)?;
        let ctx = AdapterContext {
            service: self.service.as_ref(),
            endpoint: self.endpoint.as_ref(),
            endpoint_name: &self.endpoint_name,
            titan_payload_limit: self.titan_payload_limit,
        };

        match adapters::invoke(descriptor.spec, &ctx, prompt, params).await {
            Ok(result) => {
                let mut meter = self.meter.write().unwrap();
                meter.record(descriptor.spec.model_id, &result.usage, prompt);
                Ok(result.output)
            }
            Err(e) => Ok(ModelOutput::Text(recoverable_message(e))),
        }
    }

    /// Invoke a model and flatten the output to text.
    pub async fn invoke_text(
        &self,
        model_name: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, RouterError> {
        self.invoke(model_name, prompt, params)
            .await
            .map(ModelOutput::into_text)
    }

    /// The session cost report (empty until something has been costed).
    pub fn cost_report(&self) -> String {
        self.meter.read().unwrap().report()
    }

    /// Resolve a name to a descriptor: exact menu entry first, then the
    /// fragment tables of whichever family is reachable.
    fn resolve(&self, model_name: &str) -> Result<ModelDescriptor, RouterError> {
        if self.resolved == ResolvedFamily::Unavailable {
            return Err(RouterError::NoBackendAvailable);
        }

        if let Some(descriptor) = self.registry.get(model_name) {
            return Ok(descriptor.clone());
        }

        if self.availability.bedrock {
            // Never fails: unknown names fall back to the default adapter
            return Ok(ModelDescriptor {
                display_name: model_name.to_string(),
                family: Family::Bedrock,
                spec: lookup_bedrock(model_name),
            });
        }

        match lookup_jumpstart(model_name) {
            Some(spec) => Ok(ModelDescriptor {
                display_name: model_name.to_string(),
                family: Family::Jumpstart,
                spec,
            }),
            None => {
                warn!(model = model_name, "no matching endpoint model");
                Err(RouterError::NoMatchingModel(model_name.to_string()))
            }
        }
    }
}

/// Pick the default model from the menu.
///
/// Prefers the configured name; otherwise the first Claude v2-generation
/// entry, then any Claude, then the first menu entry.
fn pick_default_model(names: &[String], preferred: &str) -> Option<String> {
    if names.iter().any(|n| n == preferred) {
        return Some(preferred.to_string());
    }
    info!(preferred, "preferred default model not discovered, scanning for a fallback");

    let mut just_claude = None;
    for name in names {
        if name.contains("Claude") && name.contains('2') {
            return Some(name.clone());
        }
        if name.contains("Claude") && just_claude.is_none() {
            just_claude = Some(name.clone());
        }
    }
    just_claude.or_else(|| names.first().cloned())
}

/// Flatten a recoverable backend failure into the user-facing message.
fn recoverable_message(error: BackendError) -> String {
    match error {
        BackendError::Throttled(_) => "Error!! Request Throttled!! Please retry later".to_string(),
        BackendError::Validation(_) => "Error!! Failure in backend model processing!!".to_string(),
        BackendError::AccessDenied(_) => {
            "Error!! Problem in accessing model, possible its not available!!".to_string()
        }
        other => other.to_string(),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
