//! Query executor for member/team searches.
//!
//! Execution order is fixed: join, filter, sort, window, project. The window
//! is applied to the filtered (and sorted) rows, never to the raw scan.

use std::cmp::Ordering;

use crate::error::Error;
use crate::storage::StorageEngine;

use super::filter::{compare_values, PredicateEvaluator};
use super::join::{HashJoinExecutor, JoinedRow};

use rosterdb_proto::{
    CountQuery, JoinSpec, MemberTeamQuery, NullOrdering, OrderDirection, OrderSpec, Pagination,
    Predicate, ProjectedRow, Projection,
};

/// Query executor that runs queries against storage.
pub struct QueryExecutor<'a> {
    storage: &'a StorageEngine,
}

impl<'a> QueryExecutor<'a> {
    /// Create a new executor over a storage engine.
    pub fn new(storage: &'a StorageEngine) -> Self {
        Self { storage }
    }

    /// Execute a query and return projected rows.
    pub fn execute(&self, query: &MemberTeamQuery) -> Result<Vec<ProjectedRow>, Error> {
        let mut rows = self.fetch_rows(&query.join, &query.filter)?;
        let matched = rows.len();

        sort_rows(&mut rows, &query.order_by);

        if let Some(pagination) = &query.pagination {
            apply_pagination(&mut rows, pagination);
        }

        tracing::trace!(
            matched,
            returned = rows.len(),
            filter = %query.filter,
            "query executed"
        );

        rows.iter()
            .map(|row| project(row, &query.projection))
            .collect()
    }

    /// Count rows matched by a join and filter.
    pub fn count(&self, query: &CountQuery) -> Result<u64, Error> {
        let join = HashJoinExecutor::build(self.storage, &query.join)?;
        let mut count = 0u64;
        for row in join.rows() {
            if PredicateEvaluator::evaluate(&query.filter, &row?) {
                count += 1;
            }
        }
        tracing::trace!(count, filter = %query.filter, "count executed");
        Ok(count)
    }

    /// Join and filter.
    fn fetch_rows(&self, join: &JoinSpec, filter: &Predicate) -> Result<Vec<JoinedRow>, Error> {
        let join = HashJoinExecutor::build(self.storage, join)?;
        let mut rows = Vec::new();

        for row in join.rows() {
            let row = row?;
            if PredicateEvaluator::evaluate(filter, &row) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

/// Sort rows according to order specifications. Stable, so ties keep scan order.
fn sort_rows(rows: &mut [JoinedRow], order_by: &[OrderSpec]) {
    if order_by.is_empty() {
        return;
    }

    rows.sort_by(|a, b| {
        for spec in order_by {
            let a_val = a.get(&spec.field);
            let b_val = b.get(&spec.field);

            let cmp = compare_for_sort(a_val.as_ref(), b_val.as_ref(), spec);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    });
}

fn compare_for_sort(
    a: Option<&rosterdb_proto::Value>,
    b: Option<&rosterdb_proto::Value>,
    spec: &OrderSpec,
) -> Ordering {
    let a_null = a.map_or(true, |v| v.is_null());
    let b_null = b.map_or(true, |v| v.is_null());

    // NULL placement is absolute when requested explicitly, otherwise NULL is
    // the lowest value and follows the direction.
    let nulls = spec.nulls.unwrap_or(match spec.direction {
        OrderDirection::Asc => NullOrdering::First,
        OrderDirection::Desc => NullOrdering::Last,
    });

    match (a_null, b_null) {
        (true, true) => Ordering::Equal,
        (true, false) => match nulls {
            NullOrdering::First => Ordering::Less,
            NullOrdering::Last => Ordering::Greater,
        },
        (false, true) => match nulls {
            NullOrdering::First => Ordering::Greater,
            NullOrdering::Last => Ordering::Less,
        },
        (false, false) => {
            let (Some(a), Some(b)) = (a, b) else {
                return Ordering::Equal;
            };
            let cmp = compare_values(a, b).unwrap_or(Ordering::Equal);
            match spec.direction {
                OrderDirection::Asc => cmp,
                OrderDirection::Desc => cmp.reverse(),
            }
        }
    }
}

/// Apply offset then limit.
fn apply_pagination(rows: &mut Vec<JoinedRow>, pagination: &Pagination) {
    let offset = pagination.offset as usize;
    let limit = pagination.limit as usize;

    if offset > 0 {
        if offset >= rows.len() {
            rows.clear();
            return;
        }
        rows.drain(0..offset);
    }

    rows.truncate(limit);
}

/// Project a joined row into the requested columns.
fn project(row: &JoinedRow, projection: &Projection) -> Result<ProjectedRow, Error> {
    let mut out = ProjectedRow::new();
    for column in &projection.columns {
        let value = row.get(&column.source).ok_or_else(|| {
            Error::InvalidData(format!("unknown field in projection: {}", column.source))
        })?;
        out.push(column.alias.clone(), value);
    }
    Ok(out)
}
