use crate::{backend::BackendRole, query::ClauseKind};
use thiserror::Error as ThisError;

///
/// PolicyError
///
/// The policy port could not produce a routing decision. Always fail-closed:
/// execution aborts before either backend is called.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PolicyError {
    #[error("policy evaluation timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("policy evaluator unavailable: {reason}")]
    Unavailable { reason: String },
}

impl PolicyError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

///
/// BackendError
///
/// A native backend call failed. Produced by `Backend`/`Statement`
/// implementations; the router wraps it with the failing target.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BackendError {
    #[error("backend execution failed: {reason}")]
    Execution { reason: String },

    #[error("backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("unknown table: {table}")]
    UnknownTable { table: String },

    #[error("backend does not support {clause} clauses")]
    UnsupportedClause { clause: ClauseKind },
}

impl BackendError {
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

///
/// MismatchError
///
/// A chained clause is supported by only one of the two mirrored builders.
/// Silent one-sided application would corrupt the dual-write guarantee, so
/// this fails fast before either side sees the clause.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("structural mismatch: {clause} clause is unsupported on the {missing_on} backend")]
pub struct MismatchError {
    pub clause: ClauseKind,
    pub missing_on: BackendRole,
}

///
/// RouterError
///
/// Everything `DualStatement::execute` can surface. No retries happen inside
/// the router; callers own reconciliation.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RouterError {
    #[error("{target} backend: {source}")]
    Backend {
        target: BackendRole,
        source: BackendError,
    },

    #[error(transparent)]
    Mismatch(#[from] MismatchError),

    /// One side of a dual write succeeded and the other failed. The succeeded
    /// write has already taken effect and there is no compensating rollback;
    /// callers must reconcile or retry idempotently.
    #[error("partial write: {succeeded} backend committed, {failed} backend failed: {source}")]
    PartialWrite {
        succeeded: BackendRole,
        failed: BackendRole,
        source: BackendError,
    },

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

impl RouterError {
    pub(crate) const fn backend(target: BackendRole, source: BackendError) -> Self {
        Self::Backend { target, source }
    }
}
