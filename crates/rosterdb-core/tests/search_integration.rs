//! Integration tests for dynamic member search.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rosterdb_core::proto::{
    CountQuery, FieldRef, MemberTeamQuery, OrderSpec, Pagination, Predicate, ProjectedRow,
};
use rosterdb_core::search::{age_goe, age_loe, compose, team_name_eq, username_eq, Filter};
use rosterdb_core::{
    Error, MemberSearchRepository, MemberTeamDto, NewMember, QueryMetrics, QuerySource,
    SearchCondition, StorageConfig, StorageEngine, Team,
};

struct TestContext {
    storage: Arc<StorageEngine>,
    team_a: Team,
    team_b: Team,
    _storage_dir: tempfile::TempDir,
}

impl TestContext {
    fn new() -> Self {
        let storage_dir = tempfile::tempdir().unwrap();
        let storage = StorageEngine::open(StorageConfig::new(storage_dir.path())).unwrap();
        let team_a = storage.insert_team("teamA").unwrap();
        let team_b = storage.insert_team("teamB").unwrap();

        Self {
            storage: Arc::new(storage),
            team_a,
            team_b,
            _storage_dir: storage_dir,
        }
    }

    /// member1(10, A), member2(11, B), member3(13, A), member4(14, B)
    fn with_four_members() -> Self {
        let ctx = Self::new();
        ctx.add("member1", 10, Some(&ctx.team_a));
        ctx.add("member2", 11, Some(&ctx.team_b));
        ctx.add("member3", 13, Some(&ctx.team_a));
        ctx.add("member4", 14, Some(&ctx.team_b));
        ctx
    }

    fn add(&self, username: &str, age: i32, team: Option<&Team>) {
        let mut member = NewMember::new(username, age);
        if let Some(team) = team {
            member = member.with_team(team);
        }
        self.storage.insert_member(member).unwrap();
    }

    fn repository(&self) -> MemberSearchRepository<Arc<StorageEngine>> {
        MemberSearchRepository::new(Arc::clone(&self.storage))
    }
}

fn usernames(rows: &[MemberTeamDto]) -> BTreeSet<String> {
    rows.iter()
        .map(|r| r.username.clone().unwrap_or_default())
        .collect()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_team_and_age_range_scenario() {
    let ctx = TestContext::with_four_members();
    let repo = ctx.repository();

    let condition = SearchCondition::unfiltered()
        .with_age_goe(13)
        .with_age_loe(14)
        .with_team_name("teamB");
    let rows = repo.search(&condition).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username.as_deref(), Some("member4"));
    assert_eq!(rows[0].age, 14);
    assert_eq!(rows[0].team_id, Some(ctx.team_b.id));
    assert_eq!(rows[0].team_name.as_deref(), Some("teamB"));
}

#[test]
fn test_unfiltered_returns_full_join() {
    let ctx = TestContext::with_four_members();
    let repo = ctx.repository();

    let rows = repo.search(&SearchCondition::unfiltered()).unwrap();
    assert_eq!(
        usernames(&rows),
        set(&["member1", "member2", "member3", "member4"])
    );

    // Same rows as a hand-built join-all query.
    let all = ctx.storage.fetch(&MemberTeamQuery::new()).unwrap();
    assert_eq!(all.len(), rows.len());
}

#[test]
fn test_blank_filters_behave_as_unfiltered() {
    let ctx = TestContext::with_four_members();
    let repo = ctx.repository();

    let condition = SearchCondition::new(Some("".into()), Some("   ".into()), None, None);
    let rows = repo.search(&condition).unwrap();
    assert_eq!(rows.len(), 4);
}

#[test]
fn test_first_full_page_issues_count_query() {
    let ctx = TestContext::with_four_members();
    let repo = ctx.repository();

    let page = repo
        .search_page_ordered(
            &SearchCondition::unfiltered(),
            Pagination::new(0, 2),
            &[OrderSpec::desc(FieldRef::member("username"))],
        )
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.total(), 4);
    assert_eq!(page.content()[0].username.as_deref(), Some("member4"));
    assert_eq!(page.content()[1].username.as_deref(), Some("member3"));
    assert!(page.has_next());
    assert_eq!(page.total_pages(), 2);

    assert_eq!(repo.metrics().count_queries(), 1);
    assert_eq!(repo.metrics().counts_skipped(), 0);
}

#[test]
fn test_short_first_page_skips_count_query() {
    let ctx = TestContext::with_four_members();
    let repo = ctx.repository();

    let condition = SearchCondition::unfiltered().with_team_name("teamA");
    let page = repo.search_page(&condition, Pagination::new(0, 10)).unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.total(), 2);
    assert!(!page.has_next());

    let metrics = repo.metrics().snapshot();
    assert_eq!(metrics.content_queries, 1);
    assert_eq!(metrics.count_queries, 0);
    assert_eq!(metrics.counts_skipped, 1);
}

#[test]
fn test_later_page_always_counts() {
    let ctx = TestContext::with_four_members();
    let repo = ctx.repository();

    // Short page, but offset > 0: earlier rows matched, so count.
    let page = repo
        .search_page(&SearchCondition::unfiltered(), Pagination::new(3, 10))
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.total(), 4);
    assert_eq!(repo.metrics().count_queries(), 1);

    // Offset past the end still reports the real total.
    let page = repo
        .search_page(&SearchCondition::unfiltered(), Pagination::new(10, 10))
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total(), 4);
}

#[test]
fn test_conditional_total_matches_always_count() {
    let ctx = TestContext::with_four_members();
    ctx.add("loner", 12, None);
    let repo = ctx.repository();

    let conditions = [
        SearchCondition::unfiltered(),
        SearchCondition::unfiltered().with_team_name("teamB"),
        SearchCondition::unfiltered().with_age_goe(11).with_age_loe(13),
        SearchCondition::unfiltered().with_username("member3"),
        SearchCondition::unfiltered().with_username("nobody"),
        SearchCondition::unfiltered().with_age_goe(20).with_age_loe(10),
    ];
    let order = [OrderSpec::asc(FieldRef::member("age"))];

    for condition in &conditions {
        for offset in 0..4 {
            for limit in 0..7 {
                let pagination = Pagination::new(offset, limit);
                let conditional = repo.search_page_ordered(condition, pagination, &order).unwrap();
                let reference = repo
                    .search_page_always_count(condition, pagination, &order)
                    .unwrap();

                assert_eq!(conditional.total(), reference.total(), "{:?} {:?}", condition, pagination);
                assert_eq!(conditional.content(), reference.content());
                assert!(conditional.len() <= limit as usize);
                assert!(conditional.total() >= conditional.len() as u64);

                if offset == 0 && conditional.len() < limit as usize {
                    assert_eq!(conditional.total(), conditional.len() as u64);
                }
            }
        }
    }
}

#[test]
fn test_member_without_team() {
    let ctx = TestContext::with_four_members();
    ctx.add("loner", 30, None);
    let repo = ctx.repository();

    let rows = repo
        .search(&SearchCondition::unfiltered().with_username("loner"))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].team_id, None);
    assert_eq!(rows[0].team_name, None);

    // Unaffected by age filters, excluded by any team name filter.
    let rows = repo
        .search(&SearchCondition::unfiltered().with_age_goe(30))
        .unwrap();
    assert_eq!(usernames(&rows), set(&["loner"]));

    for team in ["teamA", "teamB", "teamC"] {
        let rows = repo
            .search(&SearchCondition::unfiltered().with_team_name(team))
            .unwrap();
        assert!(!usernames(&rows).contains("loner"));
    }
}

#[test]
fn test_username_filter_agrees_with_scan() {
    let ctx = TestContext::with_four_members();
    ctx.add("member2", 40, Some(&ctx.team_a));
    ctx.storage.insert_member(NewMember::without_username(50)).unwrap();
    let repo = ctx.repository();

    for name in ["member1", "member2", "nobody", " member1"] {
        let rows = repo
            .search(&SearchCondition::unfiltered().with_username(name))
            .unwrap();
        assert!(rows.iter().all(|r| r.username.as_deref() == Some(name)));

        let mut expected: Vec<u64> = ctx
            .storage
            .scan_members()
            .map(|m| m.unwrap())
            .filter(|m| m.username.as_deref() == Some(name))
            .map(|m| m.id)
            .collect();
        let mut actual: Vec<u64> = rows.iter().map(|r| r.member_id).collect();
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected, "username {:?}", name);
    }
}

#[test]
fn test_composition_order_does_not_change_rows() {
    let ctx = TestContext::with_four_members();

    let conditions = [
        username_eq(&Filter::Absent),
        team_name_eq(&Filter::Present("teamB".into())),
        age_goe(&Filter::Present(11)),
        age_loe(&Filter::Present(14)),
    ];
    let forward = compose(conditions.iter().cloned());
    let reverse = compose(conditions.iter().rev().cloned());
    assert!(forward.equivalent(&reverse));

    let run = |predicate: Predicate| {
        let rows = ctx
            .storage
            .fetch(&MemberTeamQuery::new().with_filter(predicate))
            .unwrap();
        rows.iter()
            .filter_map(|r| r.get("username").and_then(|v| v.as_str()).map(String::from))
            .collect::<BTreeSet<_>>()
    };
    assert_eq!(run(forward), run(reverse));
}

#[test]
fn test_contradictory_bounds_match_nothing() {
    let ctx = TestContext::with_four_members();
    let repo = ctx.repository();

    let condition = SearchCondition::unfiltered().with_age_goe(14).with_age_loe(13);
    assert!(repo.search(&condition).unwrap().is_empty());

    let page = repo.search_page(&condition, Pagination::new(0, 5)).unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total(), 0);
}

#[test]
fn test_member_projection() {
    let ctx = TestContext::with_four_members();
    let repo = ctx.repository();

    let mut members = repo
        .search_members(&SearchCondition::unfiltered().with_team_name("teamA"))
        .unwrap();
    members.sort_by_key(|m| m.age);

    assert_eq!(members.len(), 2);
    assert_eq!(members[0].username.as_deref(), Some("member1"));
    assert_eq!(members[1].age, 13);
}

#[test]
fn test_search_survives_reopen() {
    let storage_dir = tempfile::tempdir().unwrap();
    {
        let storage = StorageEngine::open(StorageConfig::new(storage_dir.path())).unwrap();
        let team = storage.insert_team("teamB").unwrap();
        storage
            .insert_member(NewMember::new("member4", 14).with_team(&team))
            .unwrap();
        storage.flush().unwrap();
    }

    let storage = StorageEngine::open(StorageConfig::new(storage_dir.path())).unwrap();
    let repo = MemberSearchRepository::new(&storage);
    let rows = repo
        .search(&SearchCondition::unfiltered().with_team_name("teamB"))
        .unwrap();
    assert_eq!(usernames(&rows), set(&["member4"]));
}

/// A source whose count query fails.
struct FailingCount {
    inner: Arc<StorageEngine>,
    fetches: AtomicUsize,
}

impl QuerySource for FailingCount {
    fn fetch(&self, query: &MemberTeamQuery) -> Result<Vec<ProjectedRow>, Error> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(query)
    }

    fn count(&self, _query: &CountQuery) -> Result<u64, Error> {
        Err(Error::InvalidData("count unavailable".into()))
    }
}

/// A source whose reads fail.
struct FailingFetch;

impl QuerySource for FailingFetch {
    fn fetch(&self, _query: &MemberTeamQuery) -> Result<Vec<ProjectedRow>, Error> {
        Err(Error::NotFound)
    }

    fn count(&self, _query: &CountQuery) -> Result<u64, Error> {
        Ok(0)
    }
}

#[test]
fn test_source_errors_propagate_unchanged() {
    let repo = MemberSearchRepository::new(FailingFetch);
    assert!(matches!(repo.search(&SearchCondition::unfiltered()), Err(Error::NotFound)));
    assert!(matches!(
        repo.search_page(&SearchCondition::unfiltered(), Pagination::new(0, 5)),
        Err(Error::NotFound)
    ));
    assert_eq!(repo.metrics().content_queries(), 0);

    let ctx = TestContext::with_four_members();
    let repo = MemberSearchRepository::new(FailingCount {
        inner: Arc::clone(&ctx.storage),
        fetches: AtomicUsize::new(0),
    });

    // A full page needs the count, so the count failure surfaces.
    let result = repo.search_page(&SearchCondition::unfiltered(), Pagination::new(0, 2));
    match result {
        Err(Error::InvalidData(msg)) => assert_eq!(msg, "count unavailable"),
        other => panic!("expected count failure, got {:?}", other.map(|p| p.total())),
    }
    // No retry.
    assert_eq!(repo.source().fetches.load(Ordering::SeqCst), 1);

    // A short first page never asks for the count.
    let page = repo
        .search_page(&SearchCondition::unfiltered(), Pagination::new(0, 10))
        .unwrap();
    assert_eq!(page.total(), 4);
}

#[test]
fn test_shared_metrics() {
    let ctx = TestContext::with_four_members();
    let metrics = Arc::new(QueryMetrics::new());
    let first = MemberSearchRepository::with_metrics(Arc::clone(&ctx.storage), Arc::clone(&metrics));
    let second = MemberSearchRepository::with_metrics(Arc::clone(&ctx.storage), Arc::clone(&metrics));

    first.search(&SearchCondition::unfiltered()).unwrap();
    second
        .search_page(&SearchCondition::unfiltered(), Pagination::new(0, 2))
        .unwrap();
    second
        .search_page(&SearchCondition::unfiltered(), Pagination::new(0, 5))
        .unwrap();

    assert_eq!(metrics.content_queries(), 3);
    assert_eq!(metrics.count_queries(), 1);
    assert_eq!(metrics.counts_skipped(), 1);
}
