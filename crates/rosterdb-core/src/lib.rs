//! rosterdb core - storage adapter, query execution and dynamic member search.
//!
//! The search layer composes a sparse set of optional filters into one
//! conjunctive predicate, runs it against the member/team outer join, and
//! pages the result, skipping the total-count query when the first page
//! already proves the total.

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod entity;
pub mod error;
pub mod metrics;
pub mod query;
pub mod search;
pub mod seed;
pub mod storage;

pub use entity::{Member, NewMember, Team};
pub use error::Error;
pub use metrics::{new_shared_metrics, MetricsSnapshot, QueryMetrics, SharedQueryMetrics};
pub use query::{QueryExecutor, QuerySource};
pub use search::{
    build_predicate, CountStrategy, Filter, MemberDto, MemberSearchRepository, MemberTeamDto,
    Page, SearchCondition,
};
pub use seed::{seed_sample_data, SeedSummary};
pub use storage::{StorageConfig, StorageEngine};

/// Re-export protocol types.
pub use rosterdb_proto as proto;
