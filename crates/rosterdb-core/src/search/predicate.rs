//! Predicate factory.
//!
//! Each builder maps one optional filter to either `None` (no constraint) or
//! a concrete condition. [`compose`] folds whatever is present into a single
//! conjunction; with nothing present it yields [`Predicate::All`].

use super::condition::{Filter, SearchCondition};
use rosterdb_proto::{Condition, FieldRef, Predicate};

/// `member.username = v`, or no constraint when absent.
pub fn username_eq(username: &Filter<String>) -> Option<Condition> {
    username
        .value()
        .map(|v| Condition::eq(FieldRef::member("username"), v.as_str()))
}

/// `team.name = v`, or no constraint when absent.
pub fn team_name_eq(team_name: &Filter<String>) -> Option<Condition> {
    team_name
        .value()
        .map(|v| Condition::eq(FieldRef::team("name"), v.as_str()))
}

/// `member.age >= v`, or no constraint when absent.
pub fn age_goe(age: &Filter<i32>) -> Option<Condition> {
    age.value().map(|v| Condition::ge(FieldRef::member("age"), *v))
}

/// `member.age <= v`, or no constraint when absent.
pub fn age_loe(age: &Filter<i32>) -> Option<Condition> {
    age.value().map(|v| Condition::le(FieldRef::member("age"), *v))
}

/// Conjunction of the present conditions.
pub fn compose(conditions: impl IntoIterator<Item = Option<Condition>>) -> Predicate {
    conditions
        .into_iter()
        .flatten()
        .fold(Predicate::All, Predicate::and_condition)
}

/// Apply all four builders to a search condition.
pub fn build_predicate(condition: &SearchCondition) -> Predicate {
    let predicate = compose([
        username_eq(condition.username()),
        team_name_eq(condition.team_name()),
        age_goe(condition.age_goe()),
        age_loe(condition.age_loe()),
    ]);
    tracing::debug!(predicate = %predicate, "composed search predicate");
    predicate
}

/// Chained composition for callers assembling their own predicates.
///
/// Each step consumes the builder and returns a new one, so there is no
/// shared mutable state; `build()` yields the same predicate [`compose`]
/// would for the same conditions.
#[derive(Debug, Clone, Default)]
pub struct PredicateBuilder {
    predicate: Predicate,
}

impl PredicateBuilder {
    /// Start from the universal predicate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Conjoin a condition.
    pub fn and(self, condition: Condition) -> Self {
        Self {
            predicate: self.predicate.and_condition(condition),
        }
    }

    /// Conjoin a condition if one is present.
    pub fn and_some(self, condition: Option<Condition>) -> Self {
        match condition {
            Some(condition) => self.and(condition),
            None => self,
        }
    }

    /// Conjoin a condition when `test` holds.
    pub fn and_if(self, test: bool, condition: impl FnOnce() -> Condition) -> Self {
        if test {
            self.and(condition())
        } else {
            self
        }
    }

    /// Conjoin another predicate.
    pub fn and_predicate(self, predicate: Predicate) -> Self {
        Self {
            predicate: self.predicate.and(predicate),
        }
    }

    /// Finish.
    pub fn build(self) -> Predicate {
        self.predicate
    }
}
