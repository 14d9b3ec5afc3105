use crate::{query::predicate::Predicate, value::Value};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Clause
///
/// The fixed, enumerated chainable surface of a statement. Every clause a
/// caller can chain is a variant here, so a backend either supports it or the
/// mismatch is detected before anything executes.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Clause {
    Filter(Predicate),
    OrderBy {
        field: String,
        direction: OrderDirection,
    },
    Limit(u32),
    Offset(u64),
    Returning,
}

impl Clause {
    #[must_use]
    pub const fn kind(&self) -> ClauseKind {
        match self {
            Self::Filter(_) => ClauseKind::Filter,
            Self::OrderBy { .. } => ClauseKind::OrderBy,
            Self::Limit(_) => ClauseKind::Limit,
            Self::Offset(_) => ClauseKind::Offset,
            Self::Returning => ClauseKind::Returning,
        }
    }
}

///
/// ClauseKind
/// Discriminant used for support probing and diagnostics.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ClauseKind {
    #[display("filter")]
    Filter,
    #[display("order_by")]
    OrderBy,
    #[display("limit")]
    Limit,
    #[display("offset")]
    Offset,
    #[display("returning")]
    Returning,
}

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

///
/// Assign
/// One update assignment: set `field` to `value`.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Assign {
    pub field: String,
    pub value: Value,
}

impl Assign {
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_kind_matches_variant() {
        assert_eq!(Clause::Filter(Predicate::True).kind(), ClauseKind::Filter);
        assert_eq!(Clause::Limit(5).kind(), ClauseKind::Limit);
        assert_eq!(Clause::Returning.kind(), ClauseKind::Returning);
        assert_eq!(
            Clause::OrderBy {
                field: "id".to_string(),
                direction: OrderDirection::Desc,
            }
            .kind(),
            ClauseKind::OrderBy
        );
    }

    #[test]
    fn clause_kind_display_is_snake_case() {
        assert_eq!(ClauseKind::OrderBy.to_string(), "order_by");
        assert_eq!(ClauseKind::Filter.to_string(), "filter");
    }
}
