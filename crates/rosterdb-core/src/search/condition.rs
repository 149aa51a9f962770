//! Search conditions: a snapshot of up to four optional filters.

use serde::{Deserialize, Serialize};

/// One optional filter value.
///
/// Text filters are normalized on construction: `None`, `""` and
/// whitespace-only strings all become `Absent`, so later stages only ever
/// check for presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<T> {
    /// The filter is set.
    Present(T),
    /// The filter contributes no constraint.
    Absent,
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::Absent
    }
}

impl<T> Filter<T> {
    /// Check whether the filter is set.
    pub fn is_present(&self) -> bool {
        matches!(self, Filter::Present(_))
    }

    /// The filter value, if set.
    pub fn value(&self) -> Option<&T> {
        match self {
            Filter::Present(v) => Some(v),
            Filter::Absent => None,
        }
    }

    /// Convert back to a plain option.
    pub fn into_option(self) -> Option<T> {
        match self {
            Filter::Present(v) => Some(v),
            Filter::Absent => None,
        }
    }
}

impl Filter<String> {
    /// Build a text filter. Blank strings are absent; anything else is kept verbatim.
    ///
    /// Blank means every char is a breaking whitespace or an ASCII
    /// separator control, see [`is_blank_char`]. A string holding only
    /// no-break spaces is a real filter value.
    pub fn text<S: Into<String>>(value: Option<S>) -> Self {
        match value.map(Into::into) {
            Some(s) if !s.chars().all(is_blank_char) => Filter::Present(s),
            _ => Filter::Absent,
        }
    }
}

/// Whitespace for blank-filter detection.
///
/// Unicode `White_Space` minus the no-break spaces (U+00A0, U+2007, U+202F)
/// and NEL (U+0085), plus the information separators U+001C..=U+001F.
fn is_blank_char(c: char) -> bool {
    match c {
        '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{0085}' => false,
        '\u{001C}'..='\u{001F}' => true,
        c => c.is_whitespace(),
    }
}

impl From<Option<i32>> for Filter<i32> {
    fn from(value: Option<i32>) -> Self {
        match value {
            Some(v) => Filter::Present(v),
            None => Filter::Absent,
        }
    }
}

/// An immutable set of optional search filters.
///
/// No validation is performed: `age_goe > age_loe` is accepted and simply
/// matches nothing.
///
/// A condition with every filter absent matches every member. That is the
/// intended behavior, but it also means an accidentally empty condition reads
/// the whole join; callers wanting a bounded result must set a filter or page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawSearchCondition", into = "RawSearchCondition")]
pub struct SearchCondition {
    username: Filter<String>,
    team_name: Filter<String>,
    age_goe: Filter<i32>,
    age_loe: Filter<i32>,
}

impl SearchCondition {
    /// Build a condition from raw optionals, normalizing blank strings.
    pub fn new(
        username: Option<String>,
        team_name: Option<String>,
        age_goe: Option<i32>,
        age_loe: Option<i32>,
    ) -> Self {
        Self {
            username: Filter::text(username),
            team_name: Filter::text(team_name),
            age_goe: age_goe.into(),
            age_loe: age_loe.into(),
        }
    }

    /// A condition with every filter absent.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// Set the username filter.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Filter::text(Some(username));
        self
    }

    /// Set the team name filter.
    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = Filter::text(Some(team_name));
        self
    }

    /// Set the inclusive lower age bound.
    pub fn with_age_goe(mut self, age: i32) -> Self {
        self.age_goe = Filter::Present(age);
        self
    }

    /// Set the inclusive upper age bound.
    pub fn with_age_loe(mut self, age: i32) -> Self {
        self.age_loe = Filter::Present(age);
        self
    }

    pub fn username(&self) -> &Filter<String> {
        &self.username
    }

    pub fn team_name(&self) -> &Filter<String> {
        &self.team_name
    }

    pub fn age_goe(&self) -> &Filter<i32> {
        &self.age_goe
    }

    pub fn age_loe(&self) -> &Filter<i32> {
        &self.age_loe
    }

    /// Check whether every filter is absent.
    pub fn is_unfiltered(&self) -> bool {
        !self.username.is_present()
            && !self.team_name.is_present()
            && !self.age_goe.is_present()
            && !self.age_loe.is_present()
    }
}

/// Wire form: plain optionals, camelCase keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSearchCondition {
    username: Option<String>,
    team_name: Option<String>,
    age_goe: Option<i32>,
    age_loe: Option<i32>,
}

impl From<RawSearchCondition> for SearchCondition {
    fn from(raw: RawSearchCondition) -> Self {
        SearchCondition::new(raw.username, raw.team_name, raw.age_goe, raw.age_loe)
    }
}

impl From<SearchCondition> for RawSearchCondition {
    fn from(condition: SearchCondition) -> Self {
        RawSearchCondition {
            username: condition.username.into_option(),
            team_name: condition.team_name.into_option(),
            age_goe: condition.age_goe.into_option(),
            age_loe: condition.age_loe.into_option(),
        }
    }
}
