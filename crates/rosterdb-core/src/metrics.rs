//! Query accounting.
//!
//! Counts the round trips the search layer makes so the count-query skip can
//! be observed from outside.
//!
//! ```ignore
//! use rosterdb_core::metrics::new_shared_metrics;
//!
//! let metrics = new_shared_metrics();
//! metrics.record_content_query();
//! metrics.record_count_skipped();
//!
//! let prometheus_text = metrics.to_prometheus();
//! ```

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for queries issued against a store.
#[derive(Debug, Default)]
pub struct QueryMetrics {
    content_queries: AtomicU64,
    count_queries: AtomicU64,
    counts_skipped: AtomicU64,
}

/// Shared handle to query metrics.
pub type SharedQueryMetrics = Arc<QueryMetrics>;

/// Create a new shared metrics handle.
pub fn new_shared_metrics() -> SharedQueryMetrics {
    Arc::new(QueryMetrics::new())
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub content_queries: u64,
    pub count_queries: u64,
    pub counts_skipped: u64,
}

impl QueryMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a content (row-returning) query.
    pub fn record_content_query(&self) {
        self.content_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a total-count query.
    pub fn record_count_query(&self) {
        self.count_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a page whose total was derived without a count query.
    pub fn record_count_skipped(&self) {
        self.counts_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total content queries.
    pub fn content_queries(&self) -> u64 {
        self.content_queries.load(Ordering::Relaxed)
    }

    /// Get total count queries.
    pub fn count_queries(&self) -> u64 {
        self.count_queries.load(Ordering::Relaxed)
    }

    /// Get total skipped count queries.
    pub fn counts_skipped(&self) -> u64 {
        self.counts_skipped.load(Ordering::Relaxed)
    }

    /// Copy all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            content_queries: self.content_queries(),
            count_queries: self.count_queries(),
            counts_skipped: self.counts_skipped(),
        }
    }

    /// Export in Prometheus text format.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = String::new();

        let metrics = [
            (
                "rosterdb_content_queries_total",
                "Row-returning queries issued",
                snapshot.content_queries,
            ),
            (
                "rosterdb_count_queries_total",
                "Total-count queries issued",
                snapshot.count_queries,
            ),
            (
                "rosterdb_count_queries_skipped_total",
                "Pages whose total was derived from the content",
                snapshot.counts_skipped,
            ),
        ];

        for (name, help, value) in metrics {
            let _ = writeln!(out, "# HELP {} {}", name, help);
            let _ = writeln!(out, "# TYPE {} counter", name);
            let _ = writeln!(out, "{} {}", name, value);
        }

        out
    }
}
