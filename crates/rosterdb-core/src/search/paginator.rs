//! Pagination with an optional total-count query.
//!
//! Two strategies:
//! - [`CountStrategy::Always`]: content query, then count query, every time.
//! - [`CountStrategy::Conditional`]: content query first; the count query is
//!   skipped when the first page comes back short, because nothing can
//!   match past it. Any other page issues the count query.

use serde::Serialize;

use crate::error::Error;
use crate::metrics::QueryMetrics;
use crate::query::QuerySource;

use rosterdb_proto::{MemberTeamQuery, Pagination, ProjectedRow};

/// How the page total is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountStrategy {
    /// Always issue the count query.
    Always,
    /// Derive the total from a short first page, count otherwise.
    #[default]
    Conditional,
}

/// One window of results and the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    content: Vec<T>,
    total: u64,
    offset: u32,
    limit: u32,
}

impl<T> Page<T> {
    /// Assemble a page.
    pub fn new(content: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            content,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        }
    }

    /// Rows in this page.
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Take the rows.
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Total matching rows across all pages.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows in this page.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Check if this is the first page.
    pub fn is_first(&self) -> bool {
        self.offset == 0
    }

    /// Check if rows remain after this page.
    pub fn has_next(&self) -> bool {
        (self.offset as u64) + (self.content.len() as u64) < self.total
    }

    /// Number of pages of this size needed to cover the total.
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit as u64)
    }

    /// Convert every row, keeping the window and total.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        }
    }

    /// Fallible [`Page::map`].
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let content = self.content.into_iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(Page {
            content,
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        })
    }
}

/// The total implied by a page's content alone, if it is implied.
///
/// Only a first page that came back with fewer rows than the limit proves
/// the total. A full page may have more rows behind it, and a later page
/// cannot see how many rows came before it.
pub fn total_from_content(pagination: Pagination, content_len: usize) -> Option<u64> {
    if pagination.offset == 0 && content_len < pagination.limit as usize {
        Some(content_len as u64)
    } else {
        None
    }
}

/// Run a windowed query and work out the total.
///
/// Source errors are returned unchanged; nothing is retried.
pub fn paginate<S>(
    source: &S,
    query: &MemberTeamQuery,
    pagination: Pagination,
    strategy: CountStrategy,
    metrics: &QueryMetrics,
) -> Result<Page<ProjectedRow>, Error>
where
    S: QuerySource + ?Sized,
{
    let query = query.clone().with_pagination(pagination);

    let content = source.fetch(&query)?;
    metrics.record_content_query();

    let derived = match strategy {
        CountStrategy::Always => None,
        CountStrategy::Conditional => total_from_content(pagination, content.len()),
    };

    let total = match derived {
        Some(total) => {
            metrics.record_count_skipped();
            tracing::debug!(
                total,
                limit = pagination.limit,
                "short first page, count query skipped"
            );
            total
        }
        None => {
            let total = source.count(&query.count_query())?;
            metrics.record_count_query();
            tracing::debug!(
                total,
                offset = pagination.offset,
                limit = pagination.limit,
                ?strategy,
                "count query issued"
            );
            total
        }
    };

    Ok(Page::new(content, total, pagination))
}
