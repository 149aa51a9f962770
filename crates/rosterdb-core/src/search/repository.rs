//! Dynamic member search.

use std::sync::Arc;

use crate::error::Error;
use crate::metrics::{QueryMetrics, SharedQueryMetrics};
use crate::query::QuerySource;

use super::condition::SearchCondition;
use super::dto::{FromProjection, MemberDto, MemberTeamDto};
use super::paginator::{paginate, CountStrategy, Page};
use super::predicate::build_predicate;

use rosterdb_proto::{MemberTeamQuery, OrderSpec, Pagination};

/// Searches members joined to their teams using optional filters.
///
/// Stateless apart from the metrics counters; calls with different
/// conditions are independent and can run concurrently if the source allows.
pub struct MemberSearchRepository<S> {
    source: S,
    metrics: SharedQueryMetrics,
}

impl<S: QuerySource> MemberSearchRepository<S> {
    /// Create a repository over a query source.
    pub fn new(source: S) -> Self {
        Self::with_metrics(source, Arc::new(QueryMetrics::new()))
    }

    /// Create a repository that reports into shared metrics.
    pub fn with_metrics(source: S, metrics: SharedQueryMetrics) -> Self {
        Self { source, metrics }
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Query metrics.
    pub fn metrics(&self) -> &SharedQueryMetrics {
        &self.metrics
    }

    /// All matching rows, no ordering guarantee.
    ///
    /// An unfiltered condition returns the entire join.
    pub fn search(&self, condition: &SearchCondition) -> Result<Vec<MemberTeamDto>, Error> {
        self.search_ordered(condition, &[])
    }

    /// All matching rows in the requested order.
    pub fn search_ordered(
        &self,
        condition: &SearchCondition,
        order_by: &[OrderSpec],
    ) -> Result<Vec<MemberTeamDto>, Error> {
        self.search_as(condition, order_by)
    }

    /// All matching rows as username/age pairs.
    pub fn search_members(&self, condition: &SearchCondition) -> Result<Vec<MemberDto>, Error> {
        self.search_as(condition, &[])
    }

    /// One page of matching rows; the count query runs only when needed.
    pub fn search_page(
        &self,
        condition: &SearchCondition,
        pagination: Pagination,
    ) -> Result<Page<MemberTeamDto>, Error> {
        self.page_with(condition, pagination, &[], CountStrategy::Conditional)
    }

    /// One ordered page of matching rows; the count query runs only when needed.
    pub fn search_page_ordered(
        &self,
        condition: &SearchCondition,
        pagination: Pagination,
        order_by: &[OrderSpec],
    ) -> Result<Page<MemberTeamDto>, Error> {
        self.page_with(condition, pagination, order_by, CountStrategy::Conditional)
    }

    /// One page of matching rows with a freshly counted total.
    pub fn search_page_always_count(
        &self,
        condition: &SearchCondition,
        pagination: Pagination,
        order_by: &[OrderSpec],
    ) -> Result<Page<MemberTeamDto>, Error> {
        self.page_with(condition, pagination, order_by, CountStrategy::Always)
    }

    /// One page with an explicit count strategy.
    pub fn page_with(
        &self,
        condition: &SearchCondition,
        pagination: Pagination,
        order_by: &[OrderSpec],
        strategy: CountStrategy,
    ) -> Result<Page<MemberTeamDto>, Error> {
        let query = self.query_for::<MemberTeamDto>(condition, order_by);
        let page = paginate(&self.source, &query, pagination, strategy, &self.metrics)?;
        page.try_map(MemberTeamDto::from_row)
    }

    fn search_as<T: FromProjection>(
        &self,
        condition: &SearchCondition,
        order_by: &[OrderSpec],
    ) -> Result<Vec<T>, Error> {
        let query = self.query_for::<T>(condition, order_by);
        let rows = self.source.fetch(&query)?;
        self.metrics.record_content_query();
        rows.into_iter().map(T::from_row).collect()
    }

    fn query_for<T: FromProjection>(
        &self,
        condition: &SearchCondition,
        order_by: &[OrderSpec],
    ) -> MemberTeamQuery {
        if condition.is_unfiltered() {
            tracing::debug!("search condition has no filters, reading the full join");
        }
        MemberTeamQuery::new()
            .with_filter(build_predicate(condition))
            .with_projection(T::projection())
            .with_orders(order_by.to_vec())
    }
}
