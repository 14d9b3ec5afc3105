use crate::{
    backend::{Backend, Statement},
    error::BackendError,
    query::{Assign, Clause, ClauseKind, OrderDirection, Predicate},
    value::Row,
};
use async_trait::async_trait;
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

///
/// MemoryBackend
///
/// In-memory table store implementing the full backend capability surface.
/// Used by the test suite and by embedders that want one side of a migration
/// to live in process. Tables are created by the first insert; reading or
/// mutating a table that was never created is an `UnknownTable` error.
///

#[derive(Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<Mutex<BTreeMap<String, Vec<Row>>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table directly, bypassing the statement path. Test convenience.
    pub fn seed(&self, table: impl Into<String>, rows: Vec<Row>) {
        let mut tables = self.tables.lock().expect("memory backend poisoned");
        tables.entry(table.into()).or_default().extend(rows);
    }

    /// Snapshot a table's rows, or `None` if it was never created.
    #[must_use]
    pub fn table(&self, table: &str) -> Option<Vec<Row>> {
        let tables = self.tables.lock().expect("memory backend poisoned");
        tables.get(table).cloned()
    }

    fn statement(&self, table: &str, op: MemoryOp) -> Box<dyn Statement> {
        Box::new(MemoryStatement {
            tables: Arc::clone(&self.tables),
            table: table.to_string(),
            op,
            filter: Predicate::True,
            order: Vec::new(),
            limit: None,
            offset: None,
        })
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn select(&self, table: &str) -> Result<Box<dyn Statement>, BackendError> {
        Ok(self.statement(table, MemoryOp::Select))
    }

    fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Box<dyn Statement>, BackendError> {
        Ok(self.statement(table, MemoryOp::Insert(rows)))
    }

    fn update(
        &self,
        table: &str,
        assigns: Vec<Assign>,
    ) -> Result<Box<dyn Statement>, BackendError> {
        Ok(self.statement(table, MemoryOp::Update(assigns)))
    }

    fn delete(&self, table: &str) -> Result<Box<dyn Statement>, BackendError> {
        Ok(self.statement(table, MemoryOp::Delete))
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

///
/// MemoryOp
///

enum MemoryOp {
    Select,
    Insert(Vec<Row>),
    Update(Vec<Assign>),
    Delete,
}

///
/// MemoryStatement
///

struct MemoryStatement {
    tables: Arc<Mutex<BTreeMap<String, Vec<Row>>>>,
    table: String,
    op: MemoryOp,
    filter: Predicate,
    order: Vec<(String, OrderDirection)>,
    limit: Option<u32>,
    offset: Option<u64>,
}

#[async_trait]
impl Statement for MemoryStatement {
    fn supports(&self, clause: ClauseKind) -> bool {
        matches!(
            (&self.op, clause),
            (
                MemoryOp::Select,
                ClauseKind::Filter | ClauseKind::OrderBy | ClauseKind::Limit | ClauseKind::Offset,
            ) | (MemoryOp::Insert(_), ClauseKind::Returning)
                | (
                    MemoryOp::Update(_) | MemoryOp::Delete,
                    ClauseKind::Filter
                        | ClauseKind::OrderBy
                        | ClauseKind::Limit
                        | ClauseKind::Returning,
                )
        )
    }

    fn apply(&mut self, clause: &Clause) -> Result<(), BackendError> {
        if !self.supports(clause.kind()) {
            return Err(BackendError::UnsupportedClause {
                clause: clause.kind(),
            });
        }

        match clause {
            Clause::Filter(predicate) => {
                let current = std::mem::replace(&mut self.filter, Predicate::True);
                self.filter = current.and(predicate.clone());
            }
            Clause::OrderBy { field, direction } => {
                self.order.push((field.clone(), *direction));
            }
            Clause::Limit(limit) => self.limit = Some(*limit),
            Clause::Offset(offset) => self.offset = Some(*offset),
            // Write statements always return affected rows.
            Clause::Returning => {}
        }

        Ok(())
    }

    async fn execute(self: Box<Self>) -> Result<Vec<Row>, BackendError> {
        let mut tables = self.tables.lock().expect("memory backend poisoned");

        match self.op {
            MemoryOp::Select => {
                let rows = tables.get(&self.table).ok_or(BackendError::UnknownTable {
                    table: self.table.clone(),
                })?;

                let mut matched: Vec<Row> = rows
                    .iter()
                    .filter(|row| self.filter.matches(row))
                    .cloned()
                    .collect();
                sort_rows(&mut matched, &self.order);

                let offset = usize::try_from(self.offset.unwrap_or(0)).unwrap_or(usize::MAX);
                let mut matched: Vec<Row> = matched.into_iter().skip(offset).collect();
                if let Some(limit) = self.limit {
                    matched.truncate(limit as usize);
                }

                Ok(matched)
            }

            MemoryOp::Insert(rows) => {
                tables
                    .entry(self.table)
                    .or_default()
                    .extend(rows.iter().cloned());

                Ok(rows)
            }

            MemoryOp::Update(assigns) => {
                let rows = tables
                    .get_mut(&self.table)
                    .ok_or(BackendError::UnknownTable {
                        table: self.table.clone(),
                    })?;

                let targets = select_targets(rows, &self.filter, &self.order, self.limit);
                let mut updated = Vec::with_capacity(targets.len());
                for index in targets {
                    let row = &mut rows[index];
                    for assign in &assigns {
                        row.insert(assign.field.clone(), assign.value.clone());
                    }
                    updated.push(row.clone());
                }

                Ok(updated)
            }

            MemoryOp::Delete => {
                let rows = tables
                    .get_mut(&self.table)
                    .ok_or(BackendError::UnknownTable {
                        table: self.table.clone(),
                    })?;

                let mut targets = select_targets(rows, &self.filter, &self.order, self.limit);
                let mut removed = Vec::with_capacity(targets.len());
                // Remove from the back so earlier indices stay valid.
                targets.sort_unstable();
                for index in targets.into_iter().rev() {
                    removed.push(rows.remove(index));
                }
                removed.reverse();

                Ok(removed)
            }
        }
    }
}

/// Indices of rows matched by `filter`, in `order` (storage order when no
/// explicit ordering), capped at `limit`.
fn select_targets(
    rows: &[Row],
    filter: &Predicate,
    order: &[(String, OrderDirection)],
    limit: Option<u32>,
) -> Vec<usize> {
    let mut targets: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| filter.matches(row))
        .map(|(index, _)| index)
        .collect();

    if !order.is_empty() {
        targets.sort_by(|&a, &b| compare_rows(&rows[a], &rows[b], order));
    }
    if let Some(limit) = limit {
        targets.truncate(limit as usize);
    }

    targets
}

fn sort_rows(rows: &mut [Row], order: &[(String, OrderDirection)]) {
    if order.is_empty() {
        return;
    }
    rows.sort_by(|a, b| compare_rows(a, b, order));
}

fn compare_rows(a: &Row, b: &Row, order: &[(String, OrderDirection)]) -> Ordering {
    use crate::value::Value;

    let null = Value::Null;
    for (field, direction) in order {
        let left = a.get(field).unwrap_or(&null);
        let right = b.get(field).unwrap_or(&null);
        let ord = match direction {
            OrderDirection::Asc => left.total_cmp(right),
            OrderDirection::Desc => right.total_cmp(left),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}
