pub mod memory;

pub use memory::MemoryBackend;

use crate::{
    error::BackendError,
    query::{Assign, Clause, ClauseKind},
    value::Row,
};
use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// BackendRole
///
/// Which of the two stores a handle plays during migration. "Primary" is the
/// store being migrated to; it receives passthrough calls and orders first in
/// merged reads. "Secondary" is the incumbent store being migrated away from.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum BackendRole {
    #[display("primary")]
    Primary,
    #[display("secondary")]
    Secondary,
}

impl BackendRole {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

///
/// Backend
///
/// One storage backend's native query-builder factory. The two backends are
/// structurally identical from the router's point of view: every factory
/// method is invoked on both with identical arguments.
///

#[async_trait]
pub trait Backend: Send + Sync {
    /// Start a read statement against `table`.
    fn select(&self, table: &str) -> Result<Box<dyn Statement>, BackendError>;

    /// Start an insert of `rows` into `table`.
    fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Box<dyn Statement>, BackendError>;

    /// Start an update applying `assigns` to matching rows of `table`.
    fn update(&self, table: &str, assigns: Vec<Assign>)
    -> Result<Box<dyn Statement>, BackendError>;

    /// Start a delete against `table`.
    fn delete(&self, table: &str) -> Result<Box<dyn Statement>, BackendError>;

    /// Connection-lifecycle probe. Facade passthrough calls land here on the
    /// primary backend only.
    async fn ping(&self) -> Result<(), BackendError>;
}

///
/// Statement
///
/// One in-flight native builder chain. Clauses are applied in caller order;
/// `execute` is terminal and consumes the statement, so a builder is
/// single-use by construction.
///

#[async_trait]
pub trait Statement: Send {
    /// Whether this builder can accept `clause`. Probed on both sides before
    /// either side applies, so mismatch detection never half-applies.
    fn supports(&self, clause: ClauseKind) -> bool;

    /// Record one chainable clause.
    fn apply(&mut self, clause: &Clause) -> Result<(), BackendError>;

    /// Execute and return result rows. Write statements return the affected
    /// rows (post-image for inserts/updates, pre-image for deletes).
    async fn execute(self: Box<Self>) -> Result<Vec<Row>, BackendError>;
}
