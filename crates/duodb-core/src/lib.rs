//! duodb-core — the routing core of DuoDB.
//!
//! ## Crate layout
//! - `backend`: the native builder ports and the in-memory backend.
//! - `config`: deployment config with conservative defaults.
//! - `db`: the router, the dual statement proxy, and routed execution.
//! - `error`: router, policy, backend, and mismatch error types.
//! - `identity`: the caller identity handed to policy evaluation.
//! - `obs`: advisory routing metrics.
//! - `policy`: the routing decision and the policy evaluation port.
//! - `query`: statement kinds, clauses, and the predicate AST.
//! - `response`: merged read responses and write fan-out reports.
//! - `value`: the dynamic row/value model mirrored between backends.

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod obs;
pub mod policy;
pub mod query;
pub mod response;
pub mod value;

pub use db::Router;
pub use error::RouterError;

///
/// Prelude
/// The surface embedders reach for when driving a router directly.
///

pub mod prelude {
    pub use crate::{
        backend::{Backend, BackendRole, MemoryBackend, Statement},
        config::RouterConfig,
        db::{DualStatement, ReadStatement, RouteOutcome, Router, WriteStatement},
        error::{BackendError, MismatchError, PolicyError, RouterError},
        identity::IdentityContext,
        policy::{PolicyPort, RoutingDecision, StaticPolicy},
        query::{
            Assign, Clause, ClauseKind, CompareOp, OperationKind, OrderDirection, Predicate,
            StatementKind,
        },
        response::{Response, ResponseError, WriteOutcome, WriteReport},
        value::{Row, Value},
    };
}
