use serde::{Deserialize, Serialize};
use std::fmt;

///
/// IdentityContext
///
/// Immutable description of who/where an operation originates. Supplied by
/// the caller per operation and passed by value into policy evaluation; the
/// router never mutates it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IdentityContext {
    pub user_id: String,
    pub region: String,
}

impl IdentityContext {
    #[must_use]
    pub fn new(user_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            region: region.into(),
        }
    }

    /// Default context used when the caller never attaches one.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            region: "unknown".to_string(),
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.user_id == "anonymous"
    }
}

impl Default for IdentityContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl fmt::Display for IdentityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user_id, self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_the_default() {
        let ctx = IdentityContext::default();
        assert_eq!(ctx, IdentityContext::anonymous());
        assert!(ctx.is_anonymous());
    }

    #[test]
    fn explicit_context_is_not_anonymous() {
        let ctx = IdentityContext::new("user-7", "eu-west");
        assert!(!ctx.is_anonymous());
        assert_eq!(ctx.to_string(), "user-7@eu-west");
    }
}
