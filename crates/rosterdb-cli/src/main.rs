//! rosterdb command-line search
//!
//! Opens a store, optionally seeds sample data, and runs a member search
//! built from command-line filters.

mod formatter;

use clap::Parser;
use formatter::{OutputFormat, PageInfo, ResultSet};
use rosterdb_core::search::{FromProjection, MemberDto};
use rosterdb_core::{
    seed_sample_data, CountStrategy, MemberSearchRepository, MemberTeamDto, SearchCondition,
    StorageConfig, StorageEngine,
};
use rosterdb_proto::{FieldRef, OrderSpec, Pagination};
use std::path::PathBuf;

/// rosterdb member search
#[derive(Parser, Debug)]
#[command(name = "rosterdb")]
#[command(version, about = "Search members and their teams")]
pub struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./rosterdb_data")]
    pub path: PathBuf,

    /// Use a throwaway store that is removed on exit
    #[arg(long)]
    pub temporary: bool,

    /// Insert teamA, teamB and N sample members into an empty store before searching
    #[arg(long, value_name = "N")]
    pub seed: Option<usize>,

    /// Exact username
    #[arg(short, long)]
    pub username: Option<String>,

    /// Exact team name
    #[arg(short, long)]
    pub team_name: Option<String>,

    /// Minimum age, inclusive
    #[arg(long, allow_negative_numbers = true)]
    pub age_goe: Option<i32>,

    /// Maximum age, inclusive
    #[arg(long, allow_negative_numbers = true)]
    pub age_loe: Option<i32>,

    /// Rows to skip; requires --limit
    #[arg(long, requires = "limit")]
    pub offset: Option<u32>,

    /// Page size; switches to a paged search
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Sort key, repeatable: field[:asc|desc][:nulls-first|nulls-last]
    #[arg(short, long = "order", value_parser = parse_order)]
    pub order: Vec<OrderSpec>,

    /// Always run the total-count query for paged searches
    #[arg(long, requires = "limit")]
    pub always_count: bool,

    /// Output username and age only
    #[arg(long, conflicts_with_all = ["limit", "order"])]
    pub members_only: bool,

    /// Print query metrics to stderr after the search
    #[arg(long)]
    pub metrics: bool,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rosterdb=info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = if args.temporary {
        StorageConfig::temporary()
    } else {
        StorageConfig::new(&args.path)
    };
    let storage = StorageEngine::open(config)?;

    if let Some(count) = args.seed {
        seed_sample_data(&storage, count)?;
    }

    let condition = SearchCondition::new(
        args.username.clone(),
        args.team_name.clone(),
        args.age_goe,
        args.age_loe,
    );
    let repo = MemberSearchRepository::new(&storage);
    let formatter = formatter::create_formatter(args.format);

    let result = if args.members_only {
        let rows = repo.search_members(&condition)?;
        ResultSet::from_records(MemberDto::projection().aliases(), &rows)?
    } else if let Some(limit) = args.limit {
        let pagination = Pagination::new(args.offset.unwrap_or(0), limit);
        let strategy = if args.always_count {
            CountStrategy::Always
        } else {
            CountStrategy::Conditional
        };
        let page = repo.page_with(&condition, pagination, &args.order, strategy)?;
        let info = PageInfo {
            total: page.total(),
            offset: page.offset(),
            limit: page.limit(),
        };
        ResultSet::from_records(MemberTeamDto::projection().aliases(), page.content())?
            .with_page(info)
    } else {
        let rows = repo.search_ordered(&condition, &args.order)?;
        ResultSet::from_records(MemberTeamDto::projection().aliases(), &rows)?
    };

    println!("{}", formatter.format_result(&result));

    if args.metrics {
        eprintln!("{}", formatter.format_metrics(&repo.metrics().snapshot()));
    }

    Ok(())
}

/// Parse `field[:asc|desc][:nulls-first|nulls-last]`.
fn parse_order(s: &str) -> Result<OrderSpec, String> {
    let mut parts = s.split(':');
    let field = match parts.next().unwrap_or_default() {
        "memberId" | "id" => FieldRef::member("id"),
        "username" => FieldRef::member("username"),
        "age" => FieldRef::member("age"),
        "teamId" => FieldRef::team("id"),
        "teamName" => FieldRef::team("name"),
        other => return Err(format!("unknown sort field: {}", other)),
    };

    let mut spec = OrderSpec::asc(field.clone());
    for part in parts {
        spec = match part {
            "asc" => OrderSpec { direction: rosterdb_proto::OrderDirection::Asc, ..spec },
            "desc" => OrderSpec { direction: rosterdb_proto::OrderDirection::Desc, ..spec },
            "nulls-first" => spec.nulls_first(),
            "nulls-last" => spec.nulls_last(),
            other => return Err(format!("unknown sort option '{}' for {}", other, field)),
        };
    }

    Ok(spec)
}
