//! Family preference/fallback resolution.
//!
//! Decided once at startup from probed availability plus the configured
//! preference, and never re-evaluated per request.

use tracing::info;

use modelmux_core::types::Family;

/// Which family backs the default model for this process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedFamily {
    Bedrock,
    Jumpstart,
    /// Neither family is reachable; no model calls are possible.
    Unavailable,
}

/// Resolve the serving family.
///
/// - neither family available → `Unavailable`
/// - preferred family available → preferred family
/// - otherwise → the other family
pub fn resolve_family(bedrock: bool, jumpstart: bool, preferred: Family) -> ResolvedFamily {
    let resolved = match (bedrock, jumpstart) {
        (false, false) => ResolvedFamily::Unavailable,
        (true, false) => ResolvedFamily::Bedrock,
        (false, true) => ResolvedFamily::Jumpstart,
        (true, true) => match preferred {
            Family::Bedrock => ResolvedFamily::Bedrock,
            Family::Jumpstart => ResolvedFamily::Jumpstart,
        },
    };
    info!(bedrock, jumpstart, preferred = %preferred, ?resolved, "family resolved");
    resolved
}
