//! Member and team records.
//!
//! These are the rows the storage adapter persists. The search layer never
//! touches them directly; it only sees [`ProjectedRow`](rosterdb_proto::ProjectedRow)s.

use rkyv::{Archive, Deserialize, Serialize};
use rosterdb_proto::Value;
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A team.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct Team {
    /// Team identifier.
    pub id: u64,
    /// Team name.
    pub name: String,
}

impl Team {
    /// Read a field by name. Unknown fields yield `None`.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "name" => Some(Value::from(self.name.as_str())),
            _ => None,
        }
    }
}

/// A member, optionally belonging to one team.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct Member {
    /// Member identifier.
    pub id: u64,
    /// Username; nullable in the store.
    pub username: Option<String>,
    /// Age.
    pub age: i32,
    /// Owning team, if any.
    pub team_id: Option<u64>,
}

impl Member {
    /// Read a field by name. Unknown fields yield `None`.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "username" => Some(Value::from(self.username.clone())),
            "age" => Some(Value::from(self.age)),
            "team_id" => Some(Value::from(self.team_id)),
            _ => None,
        }
    }
}

/// A member to be inserted; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<u64>,
}

impl NewMember {
    /// A member with a username and no team.
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: Some(username.into()),
            age,
            team_id: None,
        }
    }

    /// A member whose username is NULL.
    pub fn without_username(age: i32) -> Self {
        Self {
            username: None,
            age,
            team_id: None,
        }
    }

    /// Assign the member to a team.
    pub fn with_team(mut self, team: &Team) -> Self {
        self.team_id = Some(team.id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_fields() {
        let member = Member {
            id: 3,
            username: None,
            age: 21,
            team_id: Some(1),
        };

        assert_eq!(member.field("id"), Some(Value::Int64(3)));
        assert_eq!(member.field("username"), Some(Value::Null));
        assert_eq!(member.field("age"), Some(Value::Int32(21)));
        assert_eq!(member.field("team_id"), Some(Value::Int64(1)));
        assert_eq!(member.field("email"), None);
    }

    #[test]
    fn test_new_member_with_team() {
        let team = Team {
            id: 9,
            name: "teamA".into(),
        };
        let member = NewMember::new("member1", 10).with_team(&team);
        assert_eq!(member.team_id, Some(9));
        assert_eq!(member.username.as_deref(), Some("member1"));
    }
}
