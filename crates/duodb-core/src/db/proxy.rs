use crate::{
    backend::{BackendRole, Statement},
    db::{Router, executor},
    error::{BackendError, MismatchError, RouterError},
    identity::IdentityContext,
    obs::RouterEvent,
    query::{Clause, ClauseKind, OperationKind, OrderDirection, Predicate, StatementKind},
    response::{Response, WriteReport},
};

///
/// RouteOutcome
/// Merged result of a generically executed dual statement.
///

#[derive(Clone, Debug, PartialEq)]
pub enum RouteOutcome {
    Read(Response),
    Write(WriteReport),
}

impl RouteOutcome {
    #[must_use]
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Read(response) => Some(response),
            Self::Write(_) => None,
        }
    }

    #[must_use]
    pub fn into_report(self) -> Option<WriteReport> {
        match self {
            Self::Write(report) => Some(report),
            Self::Read(_) => None,
        }
    }
}

///
/// DualStatement
///
/// One in-progress, not-yet-executed dual query: two live native builders
/// kept structurally mirrored, the operation kind inferred at the top-level
/// call, and the identity to hand to policy evaluation. Chaining consumes and
/// returns the statement; execution consumes it for good, so a statement is
/// single-use by move.
///

pub struct DualStatement<'a> {
    router: &'a Router,
    kind: StatementKind,
    table: String,
    primary: Box<dyn Statement>,
    secondary: Box<dyn Statement>,
    identity: Option<IdentityContext>,
    applied: Vec<ClauseKind>,
}

impl std::fmt::Debug for DualStatement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualStatement")
            .field("kind", &self.kind)
            .field("table", &self.table)
            .field("identity", &self.identity)
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}

impl<'a> DualStatement<'a> {
    pub(crate) fn new(
        router: &'a Router,
        kind: StatementKind,
        table: &str,
        primary: Box<dyn Statement>,
        secondary: Box<dyn Statement>,
    ) -> Self {
        Self {
            router,
            kind,
            table: table.to_string(),
            primary,
            secondary,
            identity: None,
            applied: Vec::new(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Clause kinds applied so far, in caller order.
    #[must_use]
    pub fn applied(&self) -> &[ClauseKind] {
        &self.applied
    }

    /// Attach or override the identity used at execution time.
    #[must_use]
    pub fn with_identity(mut self, identity: IdentityContext) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Mirror one chainable clause onto both native builders.
    ///
    /// Support is probed on both sides before either side applies, so a
    /// mismatch never leaves the pair half-updated. One-sided support is a
    /// structural mismatch and fails fast; silent one-sided application would
    /// corrupt the dual-write guarantee.
    pub fn clause(mut self, clause: Clause) -> Result<Self, RouterError> {
        let kind = clause.kind();
        let on_primary = self.primary.supports(kind);
        let on_secondary = self.secondary.supports(kind);

        match (on_primary, on_secondary) {
            (true, true) => {
                self.primary
                    .apply(&clause)
                    .map_err(|e| RouterError::backend(BackendRole::Primary, e))?;
                self.secondary
                    .apply(&clause)
                    .map_err(|e| RouterError::backend(BackendRole::Secondary, e))?;
                self.applied.push(kind);
                Ok(self)
            }
            (true, false) | (false, true) => {
                let missing_on = if on_primary {
                    BackendRole::Secondary
                } else {
                    BackendRole::Primary
                };
                self.router.record(RouterEvent::StructuralMismatch);
                Err(MismatchError {
                    clause: kind,
                    missing_on,
                }
                .into())
            }
            // Unsupported on both sides is symmetric, not a mismatch: surface
            // it as the primary backend's capability error.
            (false, false) => Err(RouterError::backend(
                BackendRole::Primary,
                BackendError::UnsupportedClause { clause: kind },
            )),
        }
    }

    /// Terminal step for an untyped statement: evaluate policy once, route,
    /// and merge. Typed wrappers call the executor directly; this exists for
    /// callers driving the proxy generically.
    pub async fn execute(self) -> Result<RouteOutcome, RouterError> {
        let operation = self.kind.operation();
        let parts = self.into_parts();
        match operation {
            OperationKind::Read => executor::execute_read(parts).await.map(RouteOutcome::Read),
            OperationKind::Write => executor::execute_write(parts).await.map(RouteOutcome::Write),
        }
    }

    pub(crate) fn into_parts(self) -> ExecutionParts<'a> {
        let identity = self
            .identity
            .unwrap_or_else(|| self.router.config().anonymous_identity.clone());

        ExecutionParts {
            router: self.router,
            kind: self.kind,
            table: self.table,
            primary: self.primary,
            secondary: self.secondary,
            identity,
        }
    }
}

///
/// ExecutionParts
/// The consumed statement, ready for routing.
///

pub(crate) struct ExecutionParts<'a> {
    pub router: &'a Router,
    pub kind: StatementKind,
    pub table: String,
    pub primary: Box<dyn Statement>,
    pub secondary: Box<dyn Statement>,
    pub identity: IdentityContext,
}

///
/// ReadStatement
/// Typed chain surface for read statements.
///

#[derive(Debug)]
pub struct ReadStatement<'a> {
    inner: DualStatement<'a>,
}

impl<'a> ReadStatement<'a> {
    pub(crate) const fn new(inner: DualStatement<'a>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.inner.kind()
    }

    #[must_use]
    pub fn applied(&self) -> &[ClauseKind] {
        self.inner.applied()
    }

    /// Add a predicate, implicitly AND-ing with any existing filter.
    pub fn filter(self, predicate: Predicate) -> Result<Self, RouterError> {
        Ok(Self::new(self.inner.clause(Clause::Filter(predicate))?))
    }

    /// Append an ascending sort key.
    pub fn order_by(self, field: &str) -> Result<Self, RouterError> {
        Ok(Self::new(self.inner.clause(Clause::OrderBy {
            field: field.to_string(),
            direction: OrderDirection::Asc,
        })?))
    }

    /// Append a descending sort key.
    pub fn order_by_desc(self, field: &str) -> Result<Self, RouterError> {
        Ok(Self::new(self.inner.clause(Clause::OrderBy {
            field: field.to_string(),
            direction: OrderDirection::Desc,
        })?))
    }

    /// Bound the per-backend result size.
    pub fn limit(self, limit: u32) -> Result<Self, RouterError> {
        Ok(Self::new(self.inner.clause(Clause::Limit(limit))?))
    }

    /// Skip leading rows on each backend.
    pub fn offset(self, offset: u64) -> Result<Self, RouterError> {
        Ok(Self::new(self.inner.clause(Clause::Offset(offset))?))
    }

    #[must_use]
    pub fn with_identity(self, identity: IdentityContext) -> Self {
        Self::new(self.inner.with_identity(identity))
    }

    /// Drop the typed surface and drive the proxy generically.
    #[must_use]
    pub fn into_inner(self) -> DualStatement<'a> {
        self.inner
    }

    /// Terminal step: evaluate policy once, fan out, and merge.
    pub async fn execute(self) -> Result<Response, RouterError> {
        executor::execute_read(self.inner.into_parts()).await
    }
}

///
/// WriteStatement
/// Typed chain surface for write statements.
///

#[derive(Debug)]
pub struct WriteStatement<'a> {
    inner: DualStatement<'a>,
}

impl<'a> WriteStatement<'a> {
    pub(crate) const fn new(inner: DualStatement<'a>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.inner.kind()
    }

    #[must_use]
    pub fn applied(&self) -> &[ClauseKind] {
        self.inner.applied()
    }

    /// Limit the write to rows matching a predicate.
    pub fn filter(self, predicate: Predicate) -> Result<Self, RouterError> {
        Ok(Self::new(self.inner.clause(Clause::Filter(predicate))?))
    }

    /// Bound how many rows the write may touch per backend.
    pub fn limit(self, limit: u32) -> Result<Self, RouterError> {
        Ok(Self::new(self.inner.clause(Clause::Limit(limit))?))
    }

    /// Request affected rows in the write outcome.
    pub fn returning(self) -> Result<Self, RouterError> {
        Ok(Self::new(self.inner.clause(Clause::Returning)?))
    }

    #[must_use]
    pub fn with_identity(self, identity: IdentityContext) -> Self {
        Self::new(self.inner.with_identity(identity))
    }

    /// Drop the typed surface and drive the proxy generically.
    #[must_use]
    pub fn into_inner(self) -> DualStatement<'a> {
        self.inner
    }

    /// Terminal step: evaluate policy once and fan the write out concurrently.
    pub async fn execute(self) -> Result<WriteReport, RouterError> {
        executor::execute_write(self.inner.into_parts()).await
    }
}
