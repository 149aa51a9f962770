//! Query IR for member/team searches.
//!
//! A [`MemberTeamQuery`] is the full request handed to a store: the join to
//! perform, the composed predicate, the projection, ordering and an optional
//! offset/limit window. [`CountQuery`] is the same request stripped down to
//! what a total-count needs.

use std::fmt;

use crate::value::Value;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// The two entity kinds a query can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub enum Entity {
    /// The primary (left) side of the join.
    Member,
    /// The optional (right) side of the join.
    Team,
}

impl Entity {
    /// Lowercase alias used in rendered queries.
    pub fn alias(&self) -> &'static str {
        match self {
            Entity::Member => "member",
            Entity::Team => "team",
        }
    }
}

/// A field qualified by the entity it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct FieldRef {
    /// Owning entity.
    pub entity: Entity,
    /// Field name on that entity.
    pub field: String,
}

impl FieldRef {
    /// Reference a member field.
    pub fn member(field: impl Into<String>) -> Self {
        Self {
            entity: Entity::Member,
            field: field.into(),
        }
    }

    /// Reference a team field.
    pub fn team(field: impl Into<String>) -> Self {
        Self {
            entity: Entity::Team,
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity.alias(), self.field)
    }
}

/// A single boolean condition over one field.
///
/// Comparisons against a NULL field (including a team field on a member with
/// no team) never match.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub enum Condition {
    /// Field equals value.
    Eq { field: FieldRef, value: Value },
    /// Field not equals value.
    Ne { field: FieldRef, value: Value },
    /// Field less than value.
    Lt { field: FieldRef, value: Value },
    /// Field less than or equal to value.
    Le { field: FieldRef, value: Value },
    /// Field greater than value.
    Gt { field: FieldRef, value: Value },
    /// Field greater than or equal to value.
    Ge { field: FieldRef, value: Value },
    /// Field is null.
    IsNull { field: FieldRef },
    /// Field is not null.
    IsNotNull { field: FieldRef },
}

impl Condition {
    /// Create an equality condition.
    pub fn eq(field: FieldRef, value: impl Into<Value>) -> Self {
        Condition::Eq {
            field,
            value: value.into(),
        }
    }

    /// Create a not-equal condition.
    pub fn ne(field: FieldRef, value: impl Into<Value>) -> Self {
        Condition::Ne {
            field,
            value: value.into(),
        }
    }

    /// Create a less-than condition.
    pub fn lt(field: FieldRef, value: impl Into<Value>) -> Self {
        Condition::Lt {
            field,
            value: value.into(),
        }
    }

    /// Create a less-than-or-equal condition.
    pub fn le(field: FieldRef, value: impl Into<Value>) -> Self {
        Condition::Le {
            field,
            value: value.into(),
        }
    }

    /// Create a greater-than condition.
    pub fn gt(field: FieldRef, value: impl Into<Value>) -> Self {
        Condition::Gt {
            field,
            value: value.into(),
        }
    }

    /// Create a greater-than-or-equal condition.
    pub fn ge(field: FieldRef, value: impl Into<Value>) -> Self {
        Condition::Ge {
            field,
            value: value.into(),
        }
    }

    /// Create an IS NULL condition.
    pub fn is_null(field: FieldRef) -> Self {
        Condition::IsNull { field }
    }

    /// Create an IS NOT NULL condition.
    pub fn is_not_null(field: FieldRef) -> Self {
        Condition::IsNotNull { field }
    }

    /// The field this condition reads.
    pub fn field(&self) -> &FieldRef {
        match self {
            Condition::Eq { field, .. }
            | Condition::Ne { field, .. }
            | Condition::Lt { field, .. }
            | Condition::Le { field, .. }
            | Condition::Gt { field, .. }
            | Condition::Ge { field, .. }
            | Condition::IsNull { field }
            | Condition::IsNotNull { field } => field,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Eq { field, value } => write!(f, "{} = {:?}", field, value),
            Condition::Ne { field, value } => write!(f, "{} <> {:?}", field, value),
            Condition::Lt { field, value } => write!(f, "{} < {:?}", field, value),
            Condition::Le { field, value } => write!(f, "{} <= {:?}", field, value),
            Condition::Gt { field, value } => write!(f, "{} > {:?}", field, value),
            Condition::Ge { field, value } => write!(f, "{} >= {:?}", field, value),
            Condition::IsNull { field } => write!(f, "{} IS NULL", field),
            Condition::IsNotNull { field } => write!(f, "{} IS NOT NULL", field),
        }
    }
}

/// A composed predicate.
///
/// Kept flat on purpose: a predicate is either the universal "match
/// everything" predicate or a conjunction of simple conditions. `And` never
/// holds an empty list; an empty conjunction is represented as `All`.
#[derive(Debug, Clone, PartialEq, Default, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub enum Predicate {
    /// Matches every row.
    #[default]
    All,
    /// All conditions must hold.
    And(Vec<Condition>),
}

impl Predicate {
    /// The universal predicate.
    pub fn all() -> Self {
        Predicate::All
    }

    /// Conjunction of the given conditions; `All` if there are none.
    pub fn and_all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let conditions: Vec<Condition> = conditions.into_iter().collect();
        if conditions.is_empty() {
            Predicate::All
        } else {
            Predicate::And(conditions)
        }
    }

    /// Conjoin two predicates, flattening the result. `All` is the identity.
    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::All, p) | (p, Predicate::All) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
        }
    }

    /// Conjoin a single condition.
    pub fn and_condition(self, condition: Condition) -> Self {
        self.and(Predicate::And(vec![condition]))
    }

    /// Check whether this is the universal predicate.
    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::All)
    }

    /// The conjuncts of this predicate (empty for `All`).
    pub fn conditions(&self) -> &[Condition] {
        match self {
            Predicate::All => &[],
            Predicate::And(conditions) => conditions,
        }
    }

    /// Check whether two predicates hold the same conditions, ignoring order.
    ///
    /// Conjunction is commutative and associative, so two flat predicates with
    /// the same multiset of conditions match exactly the same rows.
    pub fn equivalent(&self, other: &Predicate) -> bool {
        let left = self.conditions();
        let right = other.conditions();
        if left.len() != right.len() {
            return false;
        }
        left.iter().all(|c| {
            let in_left = left.iter().filter(|x| *x == c).count();
            let in_right = right.iter().filter(|x| *x == c).count();
            in_left == in_right
        })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::All => write!(f, "TRUE"),
            Predicate::And(conditions) => {
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    write!(f, "{}", condition)?;
                }
                Ok(())
            }
        }
    }
}

/// Join kind. Only the outer join is needed by searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub enum JoinKind {
    /// Keep every member, team columns NULL when there is no match.
    LeftOuter,
}

/// Join specification between the member and team entities.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct JoinSpec {
    /// Join kind.
    pub kind: JoinKind,
    /// Foreign key on the member side.
    pub from_field: FieldRef,
    /// Key on the team side.
    pub to_field: FieldRef,
}

impl JoinSpec {
    /// `member LEFT OUTER JOIN team ON member.team_id = team.id`.
    pub fn member_team() -> Self {
        Self {
            kind: JoinKind::LeftOuter,
            from_field: FieldRef::member("team_id"),
            to_field: FieldRef::team("id"),
        }
    }
}

impl Default for JoinSpec {
    fn default() -> Self {
        Self::member_team()
    }
}

/// One output column of a projection.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct ProjectionColumn {
    /// Source field.
    pub source: FieldRef,
    /// Output name.
    pub alias: String,
}

/// Mapping from a joined row to the caller-facing shape.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct Projection {
    /// Output columns, in order.
    pub columns: Vec<ProjectionColumn>,
}

impl Projection {
    /// Empty projection.
    pub fn new() -> Self {
        Self { columns: vec![] }
    }

    /// Add a column.
    pub fn column(mut self, source: FieldRef, alias: impl Into<String>) -> Self {
        self.columns.push(ProjectionColumn {
            source,
            alias: alias.into(),
        });
        self
    }

    /// `memberId, username, age, teamId, teamName`.
    pub fn member_team() -> Self {
        Self::new()
            .column(FieldRef::member("id"), "memberId")
            .column(FieldRef::member("username"), "username")
            .column(FieldRef::member("age"), "age")
            .column(FieldRef::team("id"), "teamId")
            .column(FieldRef::team("name"), "teamName")
    }

    /// `username, age`.
    pub fn member() -> Self {
        Self::new()
            .column(FieldRef::member("username"), "username")
            .column(FieldRef::member("age"), "age")
    }

    /// Output column names, in order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.alias.as_str())
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::member_team()
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Placement of NULLs in a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub enum NullOrdering {
    /// NULLs before all values.
    First,
    /// NULLs after all values.
    Last,
}

/// Order specification for sorting results.
///
/// Without an explicit [`NullOrdering`], NULL sorts as the lowest value: first
/// when ascending, last when descending.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct OrderSpec {
    /// Field to order by.
    pub field: FieldRef,
    /// Sort direction.
    pub direction: OrderDirection,
    /// Explicit NULL placement.
    pub nulls: Option<NullOrdering>,
}

impl OrderSpec {
    /// Create an ascending order spec.
    pub fn asc(field: FieldRef) -> Self {
        Self {
            field,
            direction: OrderDirection::Asc,
            nulls: None,
        }
    }

    /// Create a descending order spec.
    pub fn desc(field: FieldRef) -> Self {
        Self {
            field,
            direction: OrderDirection::Desc,
            nulls: None,
        }
    }

    /// Place NULLs first regardless of direction.
    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullOrdering::First);
        self
    }

    /// Place NULLs last regardless of direction.
    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullOrdering::Last);
        self
    }
}

/// Offset/limit window.
///
/// Both values are unsigned; a negative offset or limit cannot be expressed
/// and must be rejected by whoever parses caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct Pagination {
    /// Number of matching rows to skip.
    pub offset: u32,
    /// Maximum number of rows to return.
    pub limit: u32,
}

impl Pagination {
    /// Create pagination with offset and limit.
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }

    /// Create pagination with just a limit.
    pub fn limit(limit: u32) -> Self {
        Self { offset: 0, limit }
    }

    /// Window for a zero-based page number, or `None` if the offset
    /// does not fit in a `u32`.
    pub fn page(page: u32, size: u32) -> Option<Self> {
        Some(Self {
            offset: page.checked_mul(size)?,
            limit: size,
        })
    }
}

/// A projected read over the member/team join.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct MemberTeamQuery {
    /// Join to perform.
    pub join: JoinSpec,
    /// Composed filter.
    pub filter: Predicate,
    /// Output shape.
    pub projection: Projection,
    /// Ordering specification; empty means no ordering guarantee.
    pub order_by: Vec<OrderSpec>,
    /// Window applied after filtering and ordering.
    pub pagination: Option<Pagination>,
}

impl MemberTeamQuery {
    /// Unfiltered, unordered, unbounded query with the member/team projection.
    pub fn new() -> Self {
        Self {
            join: JoinSpec::member_team(),
            filter: Predicate::All,
            projection: Projection::member_team(),
            order_by: vec![],
            pagination: None,
        }
    }

    /// Set the filter.
    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = filter;
        self
    }

    /// Set the projection.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Add ordering.
    pub fn with_order(mut self, order: OrderSpec) -> Self {
        self.order_by.push(order);
        self
    }

    /// Replace the ordering.
    pub fn with_orders(mut self, orders: Vec<OrderSpec>) -> Self {
        self.order_by = orders;
        self
    }

    /// Set pagination.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// The matching total-count query: same join and filter, no window.
    pub fn count_query(&self) -> CountQuery {
        CountQuery {
            join: self.join.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl Default for MemberTeamQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts rows matched by a join and filter.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct CountQuery {
    /// Join to perform.
    pub join: JoinSpec,
    /// Composed filter.
    pub filter: Predicate,
}
