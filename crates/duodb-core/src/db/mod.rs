mod executor;
mod proxy;


pub use proxy::{DualStatement, ReadStatement, RouteOutcome, WriteStatement};

use crate::{
    backend::{Backend, BackendRole},
    config::RouterConfig,
    error::{BackendError, RouterError},
    obs::{MetricsReport, MetricsSink, RouterEvent, RouterMetrics},
    policy::PolicyPort,
    query::{Assign, StatementKind},
    value::Row,
};
use std::sync::Arc;

///
/// Router
///
/// The constructed routing value: two backend handles, the policy port, and
/// deployment config. Created once at startup and shared by handle; there is
/// no ambient global state. Every statement entry point builds mirrored
/// native builders on both backends with identical arguments.
///

pub struct Router {
    primary: Arc<dyn Backend>,
    secondary: Arc<dyn Backend>,
    policy: Arc<dyn PolicyPort>,
    config: RouterConfig,
    metrics: Arc<RouterMetrics>,
    sink: Option<&'static dyn MetricsSink>,
}

impl Router {
    #[must_use]
    pub fn new(
        primary: Arc<dyn Backend>,
        secondary: Arc<dyn Backend>,
        policy: Arc<dyn PolicyPort>,
    ) -> Self {
        Self {
            primary,
            secondary,
            policy,
            config: RouterConfig::default(),
            metrics: Arc::new(RouterMetrics::new()),
            sink: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach an additional static metrics sink for host telemetry.
    #[must_use]
    pub const fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics_report(&self) -> MetricsReport {
        self.metrics.report()
    }

    pub(crate) fn policy(&self) -> &dyn PolicyPort {
        self.policy.as_ref()
    }

    pub(crate) fn record(&self, event: RouterEvent) {
        self.metrics.record(event);
        if let Some(sink) = self.sink {
            sink.record(event);
        }
    }

    // ------------------------------------------------------------------
    // Statement entry points
    // ------------------------------------------------------------------

    /// Start a mirrored read.
    pub fn select(&self, table: &str) -> Result<ReadStatement<'_>, RouterError> {
        self.read_statement(StatementKind::Select, table)
    }

    /// Relational-accessor read: all matching rows.
    pub fn find_many(&self, table: &str) -> Result<ReadStatement<'_>, RouterError> {
        self.read_statement(StatementKind::FindMany, table)
    }

    /// Relational-accessor read: first matching row.
    pub fn find_first(&self, table: &str) -> Result<ReadStatement<'_>, RouterError> {
        self.read_statement(StatementKind::FindFirst, table)
    }

    /// Relational-accessor read: at most one matching row.
    pub fn find_unique(&self, table: &str) -> Result<ReadStatement<'_>, RouterError> {
        self.read_statement(StatementKind::FindUnique, table)
    }

    /// Start a mirrored insert of `rows`.
    pub fn insert(&self, table: &str, rows: Vec<Row>) -> Result<WriteStatement<'_>, RouterError> {
        let primary = self
            .primary
            .insert(table, rows.clone())
            .map_err(|e| factory_error(BackendRole::Primary, e))?;
        let secondary = self
            .secondary
            .insert(table, rows)
            .map_err(|e| factory_error(BackendRole::Secondary, e))?;

        Ok(WriteStatement::new(DualStatement::new(
            self,
            StatementKind::Insert,
            table,
            primary,
            secondary,
        )))
    }

    /// Start a mirrored update applying `assigns`.
    pub fn update(
        &self,
        table: &str,
        assigns: Vec<Assign>,
    ) -> Result<WriteStatement<'_>, RouterError> {
        let primary = self
            .primary
            .update(table, assigns.clone())
            .map_err(|e| factory_error(BackendRole::Primary, e))?;
        let secondary = self
            .secondary
            .update(table, assigns)
            .map_err(|e| factory_error(BackendRole::Secondary, e))?;

        Ok(WriteStatement::new(DualStatement::new(
            self,
            StatementKind::Update,
            table,
            primary,
            secondary,
        )))
    }

    /// Start a mirrored delete.
    pub fn delete(&self, table: &str) -> Result<WriteStatement<'_>, RouterError> {
        let primary = self
            .primary
            .delete(table)
            .map_err(|e| factory_error(BackendRole::Primary, e))?;
        let secondary = self
            .secondary
            .delete(table)
            .map_err(|e| factory_error(BackendRole::Secondary, e))?;

        Ok(WriteStatement::new(DualStatement::new(
            self,
            StatementKind::Delete,
            table,
            primary,
            secondary,
        )))
    }

    // ------------------------------------------------------------------
    // Passthrough (primary only, no dual semantics)
    // ------------------------------------------------------------------

    /// Connection-lifecycle probe, forwarded to the primary backend only.
    /// A deliberate simplification: lifecycle calls have no dual semantics.
    pub async fn ping(&self) -> Result<(), RouterError> {
        self.primary
            .ping()
            .await
            .map_err(|e| RouterError::backend(BackendRole::Primary, e))
    }

    fn read_statement(
        &self,
        kind: StatementKind,
        table: &str,
    ) -> Result<ReadStatement<'_>, RouterError> {
        debug_assert!(kind.operation().is_read());

        let primary = self
            .primary
            .select(table)
            .map_err(|e| factory_error(BackendRole::Primary, e))?;
        let secondary = self
            .secondary
            .select(table)
            .map_err(|e| factory_error(BackendRole::Secondary, e))?;

        Ok(ReadStatement::new(DualStatement::new(
            self, kind, table, primary, secondary,
        )))
    }
}

const fn factory_error(target: BackendRole, source: BackendError) -> RouterError {
    RouterError::Backend { target, source }
}
