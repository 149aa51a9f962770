//! Left outer join of members to teams.
//!
//! Algorithm (hash join):
//! 1. Build phase: scan teams once into `HashMap<team_id, Team>`
//! 2. Probe phase: for each member, look up its team in O(1)
//!
//! Members with no team, or whose team id has no matching team, are kept with
//! `team = None`.

use std::collections::HashMap;

use crate::entity::{Member, Team};
use crate::error::Error;
use crate::storage::StorageEngine;

use rosterdb_proto::{Entity, FieldRef, JoinKind, JoinSpec, Value};

/// A member together with its (optional) team.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub member: Member,
    pub team: Option<Team>,
}

impl JoinedRow {
    /// Create a joined row.
    pub fn new(member: Member, team: Option<Team>) -> Self {
        Self { member, team }
    }

    /// Read a qualified field.
    ///
    /// Team fields read as `Null` when there is no team; unknown fields
    /// read as `None`.
    pub fn get(&self, field: &FieldRef) -> Option<Value> {
        match field.entity {
            Entity::Member => self.member.field(&field.field),
            Entity::Team => match &self.team {
                Some(team) => team.field(&field.field),
                None => Some(Value::Null),
            },
        }
    }
}

/// Hash join executor for the member/team relation.
pub struct HashJoinExecutor<'a> {
    teams: HashMap<u64, Team>,
    storage: &'a StorageEngine,
}

impl<'a> HashJoinExecutor<'a> {
    /// Build phase. Fails if the join is not the supported member/team join.
    pub fn build(storage: &'a StorageEngine, join: &JoinSpec) -> Result<Self, Error> {
        check_join(join)?;

        let mut teams = HashMap::new();
        for team in storage.scan_teams() {
            let team = team?;
            teams.insert(team.id, team);
        }

        Ok(Self { teams, storage })
    }

    /// Probe phase: stream every member joined to its team.
    pub fn rows(&self) -> impl Iterator<Item = Result<JoinedRow, Error>> + '_ {
        self.storage.scan_members().map(move |member| {
            let member = member?;
            let team = member
                .team_id
                .and_then(|team_id| self.teams.get(&team_id))
                .cloned();
            Ok(JoinedRow::new(member, team))
        })
    }

    /// Number of teams on the build side.
    pub fn build_size(&self) -> usize {
        self.teams.len()
    }
}

fn check_join(join: &JoinSpec) -> Result<(), Error> {
    let expected = JoinSpec::member_team();
    match join.kind {
        JoinKind::LeftOuter
            if join.from_field == expected.from_field && join.to_field == expected.to_field =>
        {
            Ok(())
        }
        _ => Err(Error::InvalidData(format!(
            "unsupported join: {} -> {}",
            join.from_field, join.to_field
        ))),
    }
}
