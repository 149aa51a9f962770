//! rosterdb protocol types.
//!
//! This crate defines the query IR exchanged between the search layer and a
//! store: values, predicates, the member/team join, projections, ordering and
//! pagination windows, plus the projected rows a store returns.
//!
//! # Modules
//!
//! - [`value`] - Scalar values used in predicates and rows
//! - [`query`] - Predicate, join, projection and window types
//! - [`result`] - Projected rows
//! - [`error`] - Conversion error types
//!
//! All IR types derive both `rkyv` and `serde` traits, so a query can be
//! archived for transport or dumped as JSON for inspection.

pub mod error;
pub mod query;
pub mod result;
pub mod value;

pub use error::Error;

pub use query::{
    Condition, CountQuery, Entity, FieldRef, JoinKind, JoinSpec, MemberTeamQuery, NullOrdering,
    OrderDirection, OrderSpec, Pagination, Predicate, Projection, ProjectionColumn,
};
pub use result::{ColumnValue, ProjectedRow};
pub use value::Value;
