use crate::value::{Row, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Contains,
    StartsWith,
    EndsWith,
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ComparePredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

///
/// Predicate
///
/// Filter AST mirrored verbatim to both backends. Evaluation here exists for
/// the in-memory backend and tests; a native backend lowers the same AST into
/// its own query language.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Predicate {
    True,
    Compare(ComparePredicate),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    #[must_use]
    pub fn cmp(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate {
            field: field.into(),
            op,
            value: value.into(),
        })
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn in_iter(
        field: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        Self::cmp(
            field,
            CompareOp::In,
            Value::List(values.into_iter().map(Into::into).collect()),
        )
    }

    /// AND this predicate with another, flattening nested conjunctions.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::True => other,
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Evaluate against a row. Missing fields read as `Value::Null`.
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Self::True => true,
            Self::Compare(cmp) => {
                let null = Value::Null;
                let actual = row.get(&cmp.field).unwrap_or(&null);
                compare(actual, cmp.op, &cmp.value)
            }
            Self::And(parts) => parts.iter().all(|p| p.matches(row)),
            Self::Or(parts) => parts.iter().any(|p| p.matches(row)),
            Self::Not(inner) => !inner.matches(row),
        }
    }
}

fn compare(actual: &Value, op: CompareOp, expected: &Value) -> bool {
    match op {
        CompareOp::Eq => actual.total_cmp(expected) == Ordering::Equal,
        CompareOp::Ne => actual.total_cmp(expected) != Ordering::Equal,
        CompareOp::Lt => actual.total_cmp(expected) == Ordering::Less,
        CompareOp::Lte => actual.total_cmp(expected) != Ordering::Greater,
        CompareOp::Gt => actual.total_cmp(expected) == Ordering::Greater,
        CompareOp::Gte => actual.total_cmp(expected) != Ordering::Less,
        CompareOp::In => expected.contains(actual),
        CompareOp::Contains => actual.contains(expected),
        CompareOp::StartsWith => match (actual, expected) {
            (Value::Text(hay), Value::Text(prefix)) => hay.starts_with(prefix.as_str()),
            _ => false,
        },
        CompareOp::EndsWith => match (actual, expected) {
            (Value::Text(hay), Value::Text(suffix)) => hay.ends_with(suffix.as_str()),
            _ => false,
        },
    }
}
