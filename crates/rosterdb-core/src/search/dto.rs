//! Caller-facing row shapes.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use rosterdb_proto::{ProjectedRow, Projection};

/// A row type that can be read out of a projected row.
pub trait FromProjection: Sized {
    /// The projection that produces the columns this type reads.
    fn projection() -> Projection;

    /// Convert a projected row.
    fn from_row(row: ProjectedRow) -> Result<Self, Error>;
}

/// A member with its team; team columns are `None` when the member has no team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTeamDto {
    pub member_id: u64,
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<u64>,
    pub team_name: Option<String>,
}

impl FromProjection for MemberTeamDto {
    fn projection() -> Projection {
        Projection::member_team()
    }

    fn from_row(mut row: ProjectedRow) -> Result<Self, Error> {
        Ok(Self {
            member_id: row.take("memberId")?.try_into()?,
            username: row.take("username")?.try_into_optional()?,
            age: row.take("age")?.try_into()?,
            team_id: row.take("teamId")?.try_into_optional()?,
            team_name: row.take("teamName")?.try_into_optional()?,
        })
    }
}

/// Username and age only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub username: Option<String>,
    pub age: i32,
}

impl FromProjection for MemberDto {
    fn projection() -> Projection {
        Projection::member()
    }

    fn from_row(mut row: ProjectedRow) -> Result<Self, Error> {
        Ok(Self {
            username: row.take("username")?.try_into_optional()?,
            age: row.take("age")?.try_into()?,
        })
    }
}
