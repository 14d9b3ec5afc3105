use crate::{
    backend::BackendRole, config::RouterConfig, error::PolicyError, identity::IdentityContext,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// RoutingDecision
///
/// The four-boolean policy result controlling read/write fan-out for one
/// operation. Produced fresh on every execution trigger; never cached, since
/// flags may change between evaluations. The four flags are fully symmetric:
/// neither store is hard-coded mandatory, and the router does not enforce
/// that any flag is set. An all-false direction degrades to an empty result
/// rather than an error.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub read_primary: bool,
    pub read_secondary: bool,
    pub write_primary: bool,
    pub write_secondary: bool,
}

impl RoutingDecision {
    /// Route everything to the primary backend only.
    #[must_use]
    pub const fn primary_only() -> Self {
        Self {
            read_primary: true,
            read_secondary: false,
            write_primary: true,
            write_secondary: false,
        }
    }

    /// Route everything to the secondary backend only.
    #[must_use]
    pub const fn secondary_only() -> Self {
        Self {
            read_primary: false,
            read_secondary: true,
            write_primary: false,
            write_secondary: true,
        }
    }

    /// Mid-migration shape: keep serving reads from the secondary (incumbent)
    /// store while double-writing to both.
    #[must_use]
    pub const fn dual_write_read_secondary() -> Self {
        Self {
            read_primary: false,
            read_secondary: true,
            write_primary: true,
            write_secondary: true,
        }
    }

    #[must_use]
    pub const fn reads(self, role: BackendRole) -> bool {
        match role {
            BackendRole::Primary => self.read_primary,
            BackendRole::Secondary => self.read_secondary,
        }
    }

    #[must_use]
    pub const fn writes(self, role: BackendRole) -> bool {
        match role {
            BackendRole::Primary => self.write_primary,
            BackendRole::Secondary => self.write_secondary,
        }
    }
}

impl Default for RoutingDecision {
    fn default() -> Self {
        Self::primary_only()
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read[primary={} secondary={}] write[primary={} secondary={}]",
            self.read_primary, self.read_secondary, self.write_primary, self.write_secondary
        )
    }
}

///
/// PolicyPort
///
/// Boundary to the external flag evaluator. Called at most once per triggered
/// execution, never once per chained method: re-evaluating mid-chain would
/// let routing drift within a single logical operation.
///

#[async_trait]
pub trait PolicyPort: Send + Sync {
    async fn evaluate(&self, context: &IdentityContext) -> Result<RoutingDecision, PolicyError>;
}

///
/// StaticPolicy
///
/// Policy provider returning a fixed decision. Useful as a deployment
/// fallback and throughout the test suite.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPolicy {
    decision: RoutingDecision,
}

impl StaticPolicy {
    #[must_use]
    pub const fn new(decision: RoutingDecision) -> Self {
        Self { decision }
    }

    /// Build from a config's fallback decision, for deployments that run
    /// without a live flag evaluator.
    #[must_use]
    pub const fn from_config(config: &RouterConfig) -> Self {
        Self {
            decision: config.fallback_decision,
        }
    }
}

#[async_trait]
impl PolicyPort for StaticPolicy {
    async fn evaluate(&self, _context: &IdentityContext) -> Result<RoutingDecision, PolicyError> {
        Ok(self.decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_accessors_map_roles() {
        let decision = RoutingDecision {
            read_primary: true,
            read_secondary: false,
            write_primary: false,
            write_secondary: true,
        };
        assert!(decision.reads(BackendRole::Primary));
        assert!(!decision.reads(BackendRole::Secondary));
        assert!(!decision.writes(BackendRole::Primary));
        assert!(decision.writes(BackendRole::Secondary));
    }

    #[tokio::test]
    async fn static_policy_ignores_identity() {
        let policy = StaticPolicy::new(RoutingDecision::dual_write_read_secondary());
        let a = policy.evaluate(&IdentityContext::anonymous()).await.unwrap();
        let b = policy
            .evaluate(&IdentityContext::new("user-1", "eu-west"))
            .await
            .unwrap();
        assert_eq!(a, b);
        assert!(a.write_primary && a.write_secondary && a.read_secondary);
    }

    #[tokio::test]
    async fn static_policy_from_config_uses_fallback_decision() {
        let mut config = RouterConfig::new();
        config.fallback_decision = RoutingDecision::secondary_only();

        let policy = StaticPolicy::from_config(&config);
        let decision = policy.evaluate(&IdentityContext::anonymous()).await.unwrap();
        assert_eq!(decision, RoutingDecision::secondary_only());
    }
}
