//! Query engine for rosterdb.
//!
//! This module runs [`MemberTeamQuery`](rosterdb_proto::MemberTeamQuery) IR
//! against the storage engine: hash join of members to teams, predicate
//! evaluation, ordering, windowing and projection.

mod executor;
mod filter;
mod join;
mod source;

pub use executor::QueryExecutor;
pub use filter::PredicateEvaluator;
pub use join::{HashJoinExecutor, JoinedRow};
pub use source::QuerySource;
