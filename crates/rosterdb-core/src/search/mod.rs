//! Dynamic search over the member/team join.
//!
//! Flow: [`SearchCondition`] -> [`build_predicate`] -> query source ->
//! optional [`paginate`] step -> caller.

mod condition;
mod dto;
mod paginator;
mod predicate;
mod repository;

pub use condition::{Filter, SearchCondition};
pub use dto::{FromProjection, MemberDto, MemberTeamDto};
pub use paginator::{paginate, total_from_content, CountStrategy, Page};
pub use predicate::{
    age_goe, age_loe, build_predicate, compose, team_name_eq, username_eq, PredicateBuilder,
};
pub use repository::MemberSearchRepository;
