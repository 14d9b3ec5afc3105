use crate::{identity::IdentityContext, policy::RoutingDecision};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// RouterConfig
///
/// Deployment-time knobs for a router. Everything has a conservative default
/// so an empty config routes to the primary store only.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Decision used by `StaticPolicy` fallbacks and config-driven policies.
    pub fallback_decision: RoutingDecision,

    /// Identity attached to operations whose caller never supplied one.
    pub anonymous_identity: IdentityContext,

    /// Narrate routing decisions for every session built from this config.
    pub debug: bool,
}

impl RouterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|err| ConfigError::Parse {
            reason: err.to_string(),
        })
    }
}

///
/// ConfigError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("invalid router config: {reason}")]
    Parse { reason: String },
}
