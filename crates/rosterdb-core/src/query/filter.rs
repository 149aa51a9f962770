//! Predicate evaluation for query execution.
//!
//! This module provides the `PredicateEvaluator` that evaluates composed
//! predicates from the query IR against joined member/team rows.

use std::cmp::Ordering;

use super::join::JoinedRow;
use rosterdb_proto::{Condition, FieldRef, Predicate, Value};

/// Evaluates predicates against joined rows.
pub struct PredicateEvaluator;

impl PredicateEvaluator {
    /// Evaluate a predicate against a joined row.
    ///
    /// `Predicate::All` matches every row; `And` matches when every condition does.
    pub fn evaluate(predicate: &Predicate, row: &JoinedRow) -> bool {
        match predicate {
            Predicate::All => true,
            Predicate::And(conditions) => conditions.iter().all(|c| Self::evaluate_condition(c, row)),
        }
    }

    /// Evaluate a single condition.
    pub fn evaluate_condition(condition: &Condition, row: &JoinedRow) -> bool {
        match condition {
            Condition::Eq { field, value } => {
                Self::compare_field(row, field, value, |ord| ord.is_eq())
            }
            Condition::Ne { field, value } => {
                Self::compare_field(row, field, value, |ord| ord.is_ne())
            }
            Condition::Lt { field, value } => {
                Self::compare_field(row, field, value, |ord| ord.is_lt())
            }
            Condition::Le { field, value } => {
                Self::compare_field(row, field, value, |ord| ord.is_le())
            }
            Condition::Gt { field, value } => {
                Self::compare_field(row, field, value, |ord| ord.is_gt())
            }
            Condition::Ge { field, value } => {
                Self::compare_field(row, field, value, |ord| ord.is_ge())
            }
            Condition::IsNull { field } => matches!(row.get(field), None | Some(Value::Null)),
            Condition::IsNotNull { field } => {
                !matches!(row.get(field), None | Some(Value::Null))
            }
        }
    }

    /// Compare a field value against an operand.
    ///
    /// Missing fields, NULLs on either side and incompatible types never match.
    fn compare_field<F>(row: &JoinedRow, field: &FieldRef, value: &Value, accept: F) -> bool
    where
        F: FnOnce(Ordering) -> bool,
    {
        match row.get(field) {
            Some(field_value) => compare_values(&field_value, value)
                .map(accept)
                .unwrap_or(false),
            None => false, // Missing field doesn't match
        }
    }
}

/// Compare two non-null values, returning their ordering if comparable.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (Value::Int32(a), Value::Int64(b)) => Some((*a as i64).cmp(b)),
        (Value::Int64(a), Value::Int32(b)) => Some(a.cmp(&(*b as i64))),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None, // NULL or incompatible types
    }
}
