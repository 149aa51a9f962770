//! The read capability the search layer consumes.

use std::sync::Arc;

use crate::error::Error;
use crate::storage::StorageEngine;

use super::executor::QueryExecutor;
use rosterdb_proto::{CountQuery, MemberTeamQuery, ProjectedRow};

/// A store that can run projected member/team reads and counts.
///
/// Implementations own retries, timeouts and snapshot consistency. Callers
/// that need the content query and the count query to observe the same data
/// must arrange a consistent read view before calling in.
pub trait QuerySource {
    /// Run a projected read.
    fn fetch(&self, query: &MemberTeamQuery) -> Result<Vec<ProjectedRow>, Error>;

    /// Count the rows a join and filter match.
    fn count(&self, query: &CountQuery) -> Result<u64, Error>;
}

impl QuerySource for StorageEngine {
    fn fetch(&self, query: &MemberTeamQuery) -> Result<Vec<ProjectedRow>, Error> {
        QueryExecutor::new(self).execute(query)
    }

    fn count(&self, query: &CountQuery) -> Result<u64, Error> {
        QueryExecutor::new(self).count(query)
    }
}

impl<T: QuerySource + ?Sized> QuerySource for &T {
    fn fetch(&self, query: &MemberTeamQuery) -> Result<Vec<ProjectedRow>, Error> {
        (**self).fetch(query)
    }

    fn count(&self, query: &CountQuery) -> Result<u64, Error> {
        (**self).count(query)
    }
}

impl<T: QuerySource + ?Sized> QuerySource for Arc<T> {
    fn fetch(&self, query: &MemberTeamQuery) -> Result<Vec<ProjectedRow>, Error> {
        (**self).fetch(query)
    }

    fn count(&self, query: &CountQuery) -> Result<u64, Error> {
        (**self).count(query)
    }
}
