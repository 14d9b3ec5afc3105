pub mod clause;
pub mod predicate;

pub use clause::{Assign, Clause, ClauseKind, OrderDirection};
pub use predicate::{CompareOp, ComparePredicate, Predicate};

use serde::{Deserialize, Serialize};

///
/// StatementKind
///
/// The top-level call that started a statement. The relational accessors
/// (`FindMany`/`FindFirst`/`FindUnique`) are reads with select semantics and
/// an implicit result-shape contract enforced at the facade.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    FindMany,
    FindFirst,
    FindUnique,
}

impl StatementKind {
    /// Infer the operation kind once, at the initiating top-level call.
    #[must_use]
    pub const fn operation(self) -> OperationKind {
        match self {
            Self::Select | Self::FindMany | Self::FindFirst | Self::FindUnique => {
                OperationKind::Read
            }
            Self::Insert | Self::Update | Self::Delete => OperationKind::Write,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::FindMany => "find_many",
            Self::FindFirst => "find_first",
            Self::FindUnique => "find_unique",
        }
    }
}

///
/// OperationKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum OperationKind {
    Read,
    Write,
}

impl OperationKind {
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Read)
    }

    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_kind_is_inferred_from_the_top_level_call() {
        assert!(StatementKind::Select.operation().is_read());
        assert!(StatementKind::FindMany.operation().is_read());
        assert!(StatementKind::FindFirst.operation().is_read());
        assert!(StatementKind::FindUnique.operation().is_read());
        assert!(StatementKind::Insert.operation().is_write());
        assert!(StatementKind::Update.operation().is_write());
        assert!(StatementKind::Delete.operation().is_write());
    }
}
