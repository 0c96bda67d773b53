//! Core types, configuration, and utilities for Modelmux.
//!
//! # Modules
//!
//! - [`types`] — model summaries, generation parameters, invocation outputs
//! - [`config`] — typed config schema + JSON/env loader
//! - [`utils`] — path resolution and string helpers

pub mod config;
pub mod types;
pub mod utils;

pub use config::{load_config, Config};
pub use types::{
    Family, GenerationParams, ImageArtifact, Modality, ModelOutput, ModelSummary, UsageInfo,
};
