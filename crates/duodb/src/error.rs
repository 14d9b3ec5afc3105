use duodb_core::{
    backend::BackendRole,
    config::ConfigError,
    error::{BackendError, PolicyError, RouterError},
    response::ResponseError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<RouterError> for Error {
    fn from(err: RouterError) -> Self {
        let message = err.to_string();
        match err {
            RouterError::Policy(policy) => Self::new(
                ErrorKind::Policy(match policy {
                    PolicyError::Timeout { .. } => PolicyErrorKind::Timeout,
                    PolicyError::Unavailable { .. } => PolicyErrorKind::Unavailable,
                }),
                ErrorOrigin::Policy,
                message,
            ),

            RouterError::Backend { target, source } => Self::new(
                ErrorKind::Backend(backend_kind(&source)),
                target.into(),
                message,
            ),

            RouterError::PartialWrite { failed, .. } => Self::new(
                ErrorKind::Routing(RoutingErrorKind::PartialWrite),
                failed.into(),
                message,
            ),

            RouterError::Mismatch(_) => Self::new(
                ErrorKind::Routing(RoutingErrorKind::StructuralMismatch),
                ErrorOrigin::Proxy,
                message,
            ),
        }
    }
}

impl From<ResponseError> for Error {
    fn from(err: ResponseError) -> Self {
        let kind = match err {
            ResponseError::NotFound => ErrorKind::Response(ResponseErrorKind::NotFound),
            ResponseError::NotUnique { .. } => ErrorKind::Response(ResponseErrorKind::NotUnique),
        };
        Self::new(kind, ErrorOrigin::Response, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(
            ErrorKind::Config,
            ErrorOrigin::Config,
            err.to_string(),
        )
    }
}

const fn backend_kind(err: &BackendError) -> BackendErrorKind {
    match err {
        BackendError::Execution { .. } => BackendErrorKind::Execution,
        BackendError::Unavailable { .. } => BackendErrorKind::Unavailable,
        BackendError::UnknownTable { .. } => BackendErrorKind::UnknownTable,
        BackendError::UnsupportedClause { .. } => BackendErrorKind::UnsupportedClause,
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and boundary layers.
///

#[remain::sorted]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Backend(BackendErrorKind),
    Config,
    Policy(PolicyErrorKind),
    Response(ResponseErrorKind),
    Routing(RoutingErrorKind),
}

///
/// PolicyErrorKind
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PolicyErrorKind {
    /// The flag evaluator answered too slowly.
    Timeout,

    /// The flag evaluator could not be reached. Fail-closed: no backend saw
    /// the operation.
    Unavailable,
}

///
/// RoutingErrorKind
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RoutingErrorKind {
    /// One side of a dual write committed while the other failed. The origin
    /// names the failed backend; callers must reconcile or retry idempotently.
    PartialWrite,

    /// A chained clause was supported by only one of the mirrored builders.
    StructuralMismatch,
}

///
/// BackendErrorKind
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BackendErrorKind {
    Execution,
    Unavailable,
    UnknownTable,
    UnsupportedClause,
}

///
/// ResponseErrorKind
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ResponseErrorKind {
    /// Valid query, but no rows matched.
    NotFound,

    /// Query expected at most one row but matched many.
    NotUnique,
}

///
/// ErrorOrigin
/// Which part of the routed pipeline produced the failure. Backend origins
/// are routing roles, not store identities, so boundary layers can surface
/// them without leaking deployment details.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Policy,
    Primary,
    Proxy,
    Response,
    Secondary,
}

impl From<BackendRole> for ErrorOrigin {
    fn from(role: BackendRole) -> Self {
        match role {
            BackendRole::Primary => Self::Primary,
            BackendRole::Secondary => Self::Secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duodb_core::{error::MismatchError, query::ClauseKind};

    #[test]
    fn policy_errors_map_to_policy_kind() {
        let err: Error = RouterError::Policy(PolicyError::unavailable("down")).into();
        assert_eq!(err.kind, ErrorKind::Policy(PolicyErrorKind::Unavailable));
        assert_eq!(err.origin, ErrorOrigin::Policy);
    }

    #[test]
    fn partial_write_origin_is_the_failed_side() {
        let err: Error = RouterError::PartialWrite {
            succeeded: BackendRole::Primary,
            failed: BackendRole::Secondary,
            source: BackendError::execution("boom"),
        }
        .into();
        assert_eq!(err.kind, ErrorKind::Routing(RoutingErrorKind::PartialWrite));
        assert_eq!(err.origin, ErrorOrigin::Secondary);
        assert!(err.message.contains("primary backend committed"));
    }

    #[test]
    fn mismatch_maps_to_proxy_origin() {
        let err: Error = RouterError::Mismatch(MismatchError {
            clause: ClauseKind::Limit,
            missing_on: BackendRole::Primary,
        })
        .into();
        assert_eq!(
            err.kind,
            ErrorKind::Routing(RoutingErrorKind::StructuralMismatch)
        );
        assert_eq!(err.origin, ErrorOrigin::Proxy);
    }

    #[test]
    fn response_errors_map_to_response_kind() {
        let err: Error = ResponseError::NotUnique { found: 3 }.into();
        assert_eq!(err.kind, ErrorKind::Response(ResponseErrorKind::NotUnique));
        assert_eq!(err.origin, ErrorOrigin::Response);
    }
}
