//! DuoDB — a dual-backend query router for live database migrations.
//!
//! Applications talk to a [`DualDb`](db::DualDb) session exactly as they
//! would a single database handle. Under the hood every statement is mirrored
//! onto two independent backends, and a routing decision — evaluated once per
//! execution from the caller's identity — picks which backend(s) actually run
//! it and how results merge.
//!
//! ## Crate layout
//! - `db`: the session facade and session-bound query wrappers.
//! - `error`: public error type with a stable kind + origin taxonomy.
//! - `core` (re-export of `duodb-core`): router, ports, and execution.

pub use duodb_core as core;

pub mod db;
pub mod error;

pub use db::DualDb;
pub use error::Error;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// The surface application code imports to drive a dual session.
///

pub mod prelude {
    pub use crate::{
        db::{DualDb, SessionReadQuery, SessionWriteQuery},
        error::{Error, ErrorKind, ErrorOrigin},
    };
    pub use duodb_core::{
        backend::{Backend, BackendRole, MemoryBackend, Statement},
        config::RouterConfig,
        db::Router,
        identity::IdentityContext,
        policy::{PolicyPort, RoutingDecision, StaticPolicy},
        query::{Assign, CompareOp, OrderDirection, Predicate},
        response::{Response, WriteOutcome, WriteReport},
        value::{Row, Value},
    };
    pub use serde::{Deserialize, Serialize};
}
