use crate::{backend::BackendRole, value::Row};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Response
///
/// Materialized merged read result. When both backends were selected, rows
/// are primary-then-secondary concatenation with no de-duplication: during a
/// migration the two stores hold disjoint or convergent data, not a unioned
/// key space.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Response {
    rows: Vec<Row>,
}

impl Response {
    #[must_use]
    pub const fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    /// Number of rows, truncated to `u32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn count(&self) -> u32 {
        self.rows.len() as u32
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    // ------------------------------------------------------------------
    // Cardinality guards
    // ------------------------------------------------------------------

    /// Require exactly one row.
    pub fn require_one(&self) -> Result<(), ResponseError> {
        match self.rows.len() {
            1 => Ok(()),
            0 => Err(ResponseError::NotFound),
            found => Err(ResponseError::NotUnique { found }),
        }
    }

    /// Require at least one row.
    pub fn require_some(&self) -> Result<(), ResponseError> {
        if self.rows.is_empty() {
            Err(ResponseError::NotFound)
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Row extractors (consume self)
    // ------------------------------------------------------------------

    /// Require exactly one row and return it.
    pub fn one(self) -> Result<Row, ResponseError> {
        self.require_one()?;
        Ok(self.rows.into_iter().next().unwrap_or_default())
    }

    /// Require at most one row and return it.
    pub fn one_opt(mut self) -> Result<Option<Row>, ResponseError> {
        match self.rows.len() {
            0 => Ok(None),
            1 => Ok(self.rows.pop()),
            found => Err(ResponseError::NotUnique { found }),
        }
    }
}

impl From<Vec<Row>> for Response {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

///
/// ResponseError
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResponseError {
    #[error("no rows matched")]
    NotFound,

    #[error("expected one row, found {found}")]
    NotUnique { found: usize },
}

///
/// WriteOutcome
/// One backend's result for a dual write.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WriteOutcome {
    pub target: BackendRole,
    pub rows: Vec<Row>,
}

impl WriteOutcome {
    #[must_use]
    pub const fn new(target: BackendRole, rows: Vec<Row>) -> Self {
        Self { target, rows }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn rows_affected(&self) -> u64 {
        self.rows.len() as u64
    }
}

///
/// WriteReport
///
/// Aggregate result of a write fan-out, primary outcome ordered first when
/// both targets ran. An empty report means no target was selected, which the
/// router treats as success.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct WriteReport {
    outcomes: Vec<WriteOutcome>,
}

impl WriteReport {
    #[must_use]
    pub const fn new(outcomes: Vec<WriteOutcome>) -> Self {
        Self { outcomes }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    #[must_use]
    pub fn outcomes(&self) -> &[WriteOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn targets(&self) -> Vec<BackendRole> {
        self.outcomes.iter().map(|o| o.target).collect()
    }

    /// Total rows affected across all targets.
    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.outcomes.iter().map(WriteOutcome::rows_affected).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// The primary outcome when the primary target ran.
    #[must_use]
    pub fn primary(&self) -> Option<&WriteOutcome> {
        self.outcomes
            .iter()
            .find(|o| matches!(o.target, BackendRole::Primary))
    }

    /// Consume the report and return the primary outcome when it ran.
    #[must_use]
    pub fn into_primary(self) -> Option<WriteOutcome> {
        self.outcomes
            .into_iter()
            .find(|o| matches!(o.target, BackendRole::Primary))
    }
}
