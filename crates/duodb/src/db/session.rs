use crate::error::Error;
use duodb_core::{
    backend::Backend,
    config::RouterConfig,
    db::{ReadStatement, Router, WriteStatement},
    identity::IdentityContext,
    obs::MetricsReport,
    policy::PolicyPort,
    query::{Assign, Predicate, StatementKind},
    response::{Response, ResponseError, WriteReport},
    value::Row,
};
use std::sync::Arc;
use tracing::debug;

///
/// DualDb
///
/// The application-facing session: the same call surface as a single
/// database handle, secretly mirrored across two backends. Converts core
/// errors into `duodb::Error` at this boundary.
///
/// Debug contract:
/// - Debug is session-scoped; statements built from a debug session narrate
///   their composed chain and terminal step.
/// - Routing decisions themselves are always traced by the core executor.
///

pub struct DualDb {
    router: Router,
    debug: bool,
}

impl DualDb {
    /// Build a session over two backend handles and a policy port.
    #[must_use]
    pub fn new(
        primary: Arc<dyn Backend>,
        secondary: Arc<dyn Backend>,
        policy: Arc<dyn PolicyPort>,
    ) -> Self {
        Self::from_router(Router::new(primary, secondary, policy))
    }

    /// Wrap an already-configured router.
    #[must_use]
    pub const fn from_router(router: Router) -> Self {
        Self {
            router,
            debug: false,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.debug = config.debug;
        self.router = self.router.with_config(config);
        self
    }

    /// Enable debug narration for statements built from this session.
    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    #[must_use]
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// Advisory routing counters for this session's router.
    #[must_use]
    pub fn metrics_report(&self) -> MetricsReport {
        self.router.metrics_report()
    }

    //
    // Statement entry points
    //

    ///
    /// Select
    /// Start a mirrored read returning all matching rows.
    ///
    pub fn select(&self, table: &str) -> Result<SessionReadQuery<'_>, Error> {
        Ok(SessionReadQuery {
            inner: self.router.select(table)?,
            debug: self.debug,
        })
    }

    ///
    /// Find Many
    /// Relational-accessor read; equivalent to `select`.
    ///
    pub fn find_many(&self, table: &str) -> Result<SessionReadQuery<'_>, Error> {
        Ok(SessionReadQuery {
            inner: self.router.find_many(table)?,
            debug: self.debug,
        })
    }

    ///
    /// Find First
    /// Read capped at one merged row. The per-backend limit is mirrored into
    /// both native builders up front.
    ///
    pub fn find_first(&self, table: &str) -> Result<SessionReadQuery<'_>, Error> {
        Ok(SessionReadQuery {
            inner: self.router.find_first(table)?.limit(1)?,
            debug: self.debug,
        })
    }

    ///
    /// Find Unique
    /// Read that requires at most one merged row across both backends.
    ///
    pub fn find_unique(&self, table: &str) -> Result<SessionReadQuery<'_>, Error> {
        Ok(SessionReadQuery {
            inner: self.router.find_unique(table)?,
            debug: self.debug,
        })
    }

    ///
    /// Insert
    /// Start a mirrored insert of `rows`.
    ///
    pub fn insert(&self, table: &str, rows: Vec<Row>) -> Result<SessionWriteQuery<'_>, Error> {
        Ok(SessionWriteQuery {
            inner: self.router.insert(table, rows)?,
            debug: self.debug,
        })
    }

    ///
    /// Update
    /// Start a mirrored update applying `assigns` to matching rows.
    ///
    pub fn update(
        &self,
        table: &str,
        assigns: Vec<Assign>,
    ) -> Result<SessionWriteQuery<'_>, Error> {
        Ok(SessionWriteQuery {
            inner: self.router.update(table, assigns)?,
            debug: self.debug,
        })
    }

    ///
    /// Delete
    /// Start a mirrored delete.
    ///
    pub fn delete(&self, table: &str) -> Result<SessionWriteQuery<'_>, Error> {
        Ok(SessionWriteQuery {
            inner: self.router.delete(table)?,
            debug: self.debug,
        })
    }

    //
    // Passthrough (no dual semantics)
    //

    /// Connection probe, forwarded to the primary backend only.
    pub async fn ping(&self) -> Result<(), Error> {
        Ok(self.router.ping().await?)
    }
}

///
/// SessionReadQuery
/// Session-bound read chain. Converts core errors into `duodb::Error`.
///

pub struct SessionReadQuery<'a> {
    inner: ReadStatement<'a>,
    debug: bool,
}

impl SessionReadQuery<'_> {
    /// Add a predicate, implicitly AND-ing with any existing filter.
    pub fn filter(mut self, predicate: Predicate) -> Result<Self, Error> {
        self.inner = self.inner.filter(predicate)?;
        Ok(self)
    }

    /// Append an ascending sort key.
    pub fn order_by(mut self, field: &str) -> Result<Self, Error> {
        self.inner = self.inner.order_by(field)?;
        Ok(self)
    }

    /// Append a descending sort key.
    pub fn order_by_desc(mut self, field: &str) -> Result<Self, Error> {
        self.inner = self.inner.order_by_desc(field)?;
        Ok(self)
    }

    /// Bound the per-backend result size.
    pub fn limit(mut self, limit: u32) -> Result<Self, Error> {
        self.inner = self.inner.limit(limit)?;
        Ok(self)
    }

    /// Skip leading rows on each backend.
    pub fn offset(mut self, offset: u64) -> Result<Self, Error> {
        self.inner = self.inner.offset(offset)?;
        Ok(self)
    }

    /// Attach or override the identity used at execution time.
    #[must_use]
    pub fn with_identity(mut self, identity: IdentityContext) -> Self {
        self.inner = self.inner.with_identity(identity);
        self
    }

    /// Execute this query using the session's routing policy.
    pub async fn execute(self) -> Result<Response, Error> {
        let kind = self.inner.kind();
        if self.debug {
            debug!(
                op = kind.as_str(),
                clauses = self.inner.applied().len(),
                "executing session read"
            );
        }

        let response = self.inner.execute().await?;

        match kind {
            StatementKind::FindFirst => {
                let mut rows = response.into_rows();
                rows.truncate(1);
                Ok(Response::new(rows))
            }
            StatementKind::FindUnique => {
                let found = response.rows().len();
                if found > 1 {
                    return Err(ResponseError::NotUnique { found }.into());
                }
                Ok(response)
            }
            _ => Ok(response),
        }
    }

    /// Execute and return all merged rows.
    pub async fn all(self) -> Result<Vec<Row>, Error> {
        Ok(self.execute().await?.into_rows())
    }

    /// Execute and require exactly one merged row.
    pub async fn one(self) -> Result<Row, Error> {
        Ok(self.execute().await?.one()?)
    }

    /// Execute and return zero or one merged row.
    pub async fn one_opt(self) -> Result<Option<Row>, Error> {
        Ok(self.execute().await?.one_opt()?)
    }
}

///
/// SessionWriteQuery
/// Session-bound write chain. Converts core errors into `duodb::Error`.
///

pub struct SessionWriteQuery<'a> {
    inner: WriteStatement<'a>,
    debug: bool,
}

impl SessionWriteQuery<'_> {
    /// Limit the write to rows matching a predicate.
    pub fn filter(mut self, predicate: Predicate) -> Result<Self, Error> {
        self.inner = self.inner.filter(predicate)?;
        Ok(self)
    }

    /// Bound how many rows the write may touch per backend.
    pub fn limit(mut self, limit: u32) -> Result<Self, Error> {
        self.inner = self.inner.limit(limit)?;
        Ok(self)
    }

    /// Request affected rows in the write outcome.
    pub fn returning(mut self) -> Result<Self, Error> {
        self.inner = self.inner.returning()?;
        Ok(self)
    }

    /// Attach or override the identity used at execution time.
    #[must_use]
    pub fn with_identity(mut self, identity: IdentityContext) -> Self {
        self.inner = self.inner.with_identity(identity);
        self
    }

    /// Execute this write using the session's routing policy.
    pub async fn execute(self) -> Result<WriteReport, Error> {
        if self.debug {
            debug!(
                op = self.inner.kind().as_str(),
                clauses = self.inner.applied().len(),
                "executing session write"
            );
        }
        Ok(self.inner.execute().await?)
    }

    /// Execute and return total rows affected across all targets.
    pub async fn rows_affected(self) -> Result<u64, Error> {
        Ok(self.execute().await?.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ErrorOrigin, PolicyErrorKind, ResponseErrorKind};
    use duodb_core::{
        backend::{BackendRole, MemoryBackend},
        policy::{RoutingDecision, StaticPolicy},
        value::Value,
    };

    fn row(id: i64, name: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::Int(id));
        row.insert("name".to_string(), Value::from(name));
        row
    }

    fn session(decision: RoutingDecision) -> (DualDb, MemoryBackend, MemoryBackend) {
        let primary = MemoryBackend::new();
        let secondary = MemoryBackend::new();
        let db = DualDb::new(
            Arc::new(primary.clone()),
            Arc::new(secondary.clone()),
            Arc::new(StaticPolicy::new(decision)),
        );
        (db, primary, secondary)
    }

    #[tokio::test]
    async fn dual_write_lands_in_both_stores() {
        let (db, primary, secondary) = session(RoutingDecision {
            read_primary: false,
            read_secondary: true,
            write_primary: true,
            write_secondary: true,
        });

        let report = db
            .insert("users", vec![row(1, "ann"), row(2, "bob")])
            .unwrap()
            .execute()
            .await
            .unwrap();

        assert_eq!(
            report.targets(),
            vec![BackendRole::Primary, BackendRole::Secondary]
        );
        assert_eq!(primary.table("users").unwrap().len(), 2);
        assert_eq!(secondary.table("users").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reads_follow_the_read_flags() {
        let (db, primary, secondary) = session(RoutingDecision::secondary_only());
        primary.seed("users", vec![row(1, "primary-copy")]);
        secondary.seed("users", vec![row(1, "secondary-copy")]);

        let rows = db.select("users").unwrap().all().await.unwrap();
        assert_eq!(rows, vec![row(1, "secondary-copy")]);
    }

    #[tokio::test]
    async fn chained_filters_apply_on_the_routed_side() {
        let (db, primary, _secondary) = session(RoutingDecision::primary_only());
        primary.seed(
            "users",
            vec![row(1, "ann"), row(2, "bob"), row(3, "cid")],
        );

        let rows = db
            .select("users")
            .unwrap()
            .filter(Predicate::gt("id", 1i64))
            .unwrap()
            .order_by_desc("id")
            .unwrap()
            .all()
            .await
            .unwrap();
        assert_eq!(rows, vec![row(3, "cid"), row(2, "bob")]);
    }

    #[tokio::test]
    async fn find_first_returns_at_most_one_merged_row() {
        let (db, primary, secondary) = session(RoutingDecision {
            read_primary: true,
            read_secondary: true,
            write_primary: false,
            write_secondary: false,
        });
        primary.seed("users", vec![row(1, "primary-copy")]);
        secondary.seed("users", vec![row(1, "secondary-copy")]);

        // Both sides hold a row; the merged first is the primary's.
        let first = db
            .find_first("users")
            .unwrap()
            .one_opt()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, row(1, "primary-copy"));
    }

    #[tokio::test]
    async fn find_unique_rejects_cross_backend_duplicates() {
        let (db, primary, secondary) = session(RoutingDecision {
            read_primary: true,
            read_secondary: true,
            write_primary: false,
            write_secondary: false,
        });
        primary.seed("users", vec![row(1, "ann")]);
        secondary.seed("users", vec![row(1, "ann")]);

        let err = db
            .find_unique("users")
            .unwrap()
            .filter(Predicate::eq("id", 1i64))
            .unwrap()
            .execute()
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Response(ResponseErrorKind::NotUnique));
        assert_eq!(err.origin, ErrorOrigin::Response);
    }

    #[tokio::test]
    async fn update_then_delete_round_trip() {
        let (db, primary, _secondary) = session(RoutingDecision::primary_only());
        primary.seed("users", vec![row(1, "ann"), row(2, "bob")]);

        let updated = db
            .update("users", vec![Assign::new("name", "renamed")])
            .unwrap()
            .filter(Predicate::eq("id", 2i64))
            .unwrap()
            .rows_affected()
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let deleted = db
            .delete("users")
            .unwrap()
            .filter(Predicate::eq("id", 1i64))
            .unwrap()
            .rows_affected()
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let remaining = db.select("users").unwrap().all().await.unwrap();
        assert_eq!(remaining, vec![row(2, "renamed")]);
    }

    #[tokio::test]
    async fn policy_failure_converts_at_the_boundary() {
        use duodb_core::error::PolicyError;

        struct DownPolicy;

        #[async_trait::async_trait]
        impl PolicyPort for DownPolicy {
            async fn evaluate(
                &self,
                _context: &IdentityContext,
            ) -> Result<RoutingDecision, PolicyError> {
                Err(PolicyError::unavailable("flag service unreachable"))
            }
        }

        let primary = MemoryBackend::new();
        let secondary = MemoryBackend::new();
        let db = DualDb::new(
            Arc::new(primary),
            Arc::new(secondary),
            Arc::new(DownPolicy),
        );

        let err = db.select("users").unwrap().execute().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Policy(PolicyErrorKind::Unavailable));
        assert_eq!(err.origin, ErrorOrigin::Policy);
    }

    #[tokio::test]
    async fn ping_is_a_primary_passthrough() {
        let (db, _primary, _secondary) = session(RoutingDecision::primary_only());
        db.ping().await.unwrap();
    }
}
