//! Sample data.

use crate::entity::NewMember;
use crate::error::Error;
use crate::storage::StorageEngine;

/// What [`seed_sample_data`] inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub teams: usize,
    pub members: usize,
}

/// Insert `teamA`, `teamB` and `count` members into an empty store.
///
/// Member `i` is named `member{i}`, is `i` years old and belongs to `teamA`
/// when `i` is even, `teamB` otherwise. A store that already holds teams or
/// members is rejected with [`Error::InvalidData`] and left unchanged.
pub fn seed_sample_data(storage: &StorageEngine, count: usize) -> Result<SeedSummary, Error> {
    if storage.team_count() > 0 || storage.member_count() > 0 {
        return Err(Error::InvalidData(format!(
            "cannot seed a non-empty store ({} teams, {} members)",
            storage.team_count(),
            storage.member_count()
        )));
    }

    let team_a = storage.insert_team("teamA")?;
    let team_b = storage.insert_team("teamB")?;

    for i in 0..count {
        let team = if i % 2 == 0 { &team_a } else { &team_b };
        let age = i32::try_from(i)
            .map_err(|_| Error::InvalidData(format!("member age out of range: {}", i)))?;
        storage.insert_member(NewMember::new(format!("member{}", i), age).with_team(team))?;
    }

    storage.flush()?;
    tracing::info!(teams = 2, members = count, "sample data seeded");

    Ok(SeedSummary {
        teams: 2,
        members: count,
    })
}
