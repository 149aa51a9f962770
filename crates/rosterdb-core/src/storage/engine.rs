//! Storage engine implementation.

use super::{EntityKey, StorageConfig, StoredRecord};
use crate::entity::{Member, NewMember, Team};
use crate::error::Error;
use sled::{Db, Tree};

/// The storage engine wrapping sled.
pub struct StorageEngine {
    /// The underlying sled database.
    db: Db,

    /// Tree for team records.
    team_tree: Tree,

    /// Tree for member records.
    member_tree: Tree,
}

impl StorageEngine {
    /// Open or create a storage engine with the given configuration.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        let sled_config = config.to_sled_config();
        let db = sled_config.open()?;
        let team_tree = db.open_tree(Team::TREE)?;
        let member_tree = db.open_tree(Member::TREE)?;

        tracing::info!(
            path = %config.path.display(),
            temporary = config.temporary,
            recovered = db.was_recovered(),
            "storage opened"
        );

        Ok(Self {
            db,
            team_tree,
            member_tree,
        })
    }

    /// Check if the database was recovered from a previous run.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    /// Allocate a fresh, monotonically increasing id.
    pub fn generate_id(&self) -> Result<u64, Error> {
        Ok(self.db.generate_id()?)
    }

    // ========== Writes (seeding and tests only; searches never write) ==========

    /// Insert a new team.
    pub fn insert_team(&self, name: impl Into<String>) -> Result<Team, Error> {
        let team = Team {
            id: self.generate_id()?,
            name: name.into(),
        };
        self.put(&self.team_tree, &team)?;
        Ok(team)
    }

    /// Insert a new member. The referenced team, if any, must exist.
    pub fn insert_member(&self, new: NewMember) -> Result<Member, Error> {
        if let Some(team_id) = new.team_id {
            if self.get_team(team_id)?.is_none() {
                return Err(Error::NotFound);
            }
        }

        let member = Member {
            id: self.generate_id()?,
            username: new.username,
            age: new.age,
            team_id: new.team_id,
        };
        self.put(&self.member_tree, &member)?;
        Ok(member)
    }

    fn put<R: StoredRecord>(&self, tree: &Tree, record: &R) -> Result<(), Error> {
        let key = EntityKey(record.id());
        tree.insert(key.encode(), record.to_bytes()?)?;
        Ok(())
    }

    // ========== Reads ==========

    /// Get a team by id.
    pub fn get_team(&self, id: u64) -> Result<Option<Team>, Error> {
        Self::get(&self.team_tree, id)
    }

    /// Get a member by id.
    pub fn get_member(&self, id: u64) -> Result<Option<Member>, Error> {
        Self::get(&self.member_tree, id)
    }

    fn get<R: StoredRecord>(tree: &Tree, id: u64) -> Result<Option<R>, Error> {
        match tree.get(EntityKey(id).encode())? {
            Some(bytes) => Ok(Some(R::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Scan all teams.
    pub fn scan_teams(&self) -> impl Iterator<Item = Result<Team, Error>> + '_ {
        Self::scan(&self.team_tree)
    }

    /// Scan all members.
    pub fn scan_members(&self) -> impl Iterator<Item = Result<Member, Error>> + '_ {
        Self::scan(&self.member_tree)
    }

    fn scan<R: StoredRecord>(tree: &Tree) -> impl Iterator<Item = Result<R, Error>> + '_ {
        tree.iter().map(|result| {
            let (key, value) = result?;
            EntityKey::decode(&key).ok_or(Error::InvalidKey)?;
            R::from_bytes(&value)
        })
    }

    /// Number of stored members.
    pub fn member_count(&self) -> usize {
        self.member_tree.len()
    }

    /// Number of stored teams.
    pub fn team_count(&self) -> usize {
        self.team_tree.len()
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> StorageEngine {
        StorageEngine::open(StorageConfig::temporary()).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let engine = open_temp();
        let team = engine.insert_team("teamA").unwrap();
        let member = engine
            .insert_member(NewMember::new("member1", 10).with_team(&team))
            .unwrap();

        assert_eq!(engine.get_team(team.id).unwrap(), Some(team.clone()));
        assert_eq!(engine.get_member(member.id).unwrap(), Some(member.clone()));
        assert_eq!(member.team_id, Some(team.id));
        assert_eq!(engine.get_member(u64::MAX).unwrap(), None);
    }

    #[test]
    fn test_ids_are_unique() {
        let engine = open_temp();
        let a = engine.insert_team("teamA").unwrap();
        let b = engine.insert_team("teamB").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_member_with_unknown_team_is_rejected() {
        let engine = open_temp();
        let ghost = Team {
            id: 999,
            name: "ghost".into(),
        };
        let result = engine.insert_member(NewMember::new("member1", 10).with_team(&ghost));
        assert!(matches!(result, Err(Error::NotFound)));
        assert_eq!(engine.member_count(), 0);
    }

    #[test]
    fn test_scan() {
        let engine = open_temp();
        engine.insert_team("teamA").unwrap();
        engine.insert_member(NewMember::new("member1", 10)).unwrap();
        engine.insert_member(NewMember::without_username(11)).unwrap();

        let members: Vec<Member> = engine.scan_members().collect::<Result<_, _>>().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(engine.team_count(), 1);
        assert_eq!(engine.scan_teams().count(), 1);
    }
}
