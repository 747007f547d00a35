//! Leaderboard CLI over the stored 5 verst results
//!
//! ## Usage
//!
//! ```bash
//! verstboard leaderboard --location korolev --year 2024 --season зима
//! verstboard leaderboard --location all --page 2
//! verstboard medals "Иван ПЕТРОВ"
//! ```
//!
//! ## Environment Variables
//!
//! - VERST_DB_PATH - SQLite database path (default: data/verst.db)
//! - VERST_DEFAULT_LOCATION - Location when --location is omitted (default: korolev)
//! - RUST_LOG - Logging level (optional, default: info)

use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use verstboard::leaderboard::{
    AgeGroupFacet, LeaderboardEngine, LeaderboardQuery, LocationScope, Season, TemporalFilter,
};
use verstboard::{AppConfig, SqliteRecordStore};

#[derive(Parser, Debug)]
#[command(version, about = "Participant leaderboards for 5 verst results", long_about = None)]
struct Cli {
    /// SQLite database (overrides VERST_DB_PATH)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct LocationArg {
    /// Location slug, or "all"
    #[arg(short, long)]
    location: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ranked participant standings
    Leaderboard {
        #[command(flatten)]
        location: LocationArg,

        #[arg(long)]
        event_number: Option<u32>,

        #[arg(long)]
        year: Option<i32>,

        /// зима, весна, лето or осень
        #[arg(long)]
        season: Option<String>,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Use the season containing today
        #[arg(long)]
        current_season: bool,

        /// Gender and age group, e.g. М40-44
        #[arg(long)]
        facet: Option<AgeGroupFacet>,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Medals won by a runner, newest first
    Medals {
        name: String,

        #[command(flatten)]
        location: LocationArg,
    },
    /// Years with stored events
    Years {
        #[command(flatten)]
        location: LocationArg,
    },
    /// Numbered events and their dates
    Races {
        #[command(flatten)]
        location: LocationArg,
    },
    /// Gender and age group keys usable with --facet
    AgeGroups {
        #[command(flatten)]
        location: LocationArg,
    },
    /// Find runners by id or name
    Search { query: String },
    /// Locations with stored events
    Locations,
}

fn scope(location: &LocationArg, config: &AppConfig) -> LocationScope {
    LocationScope::from_token(location.location.as_deref().unwrap_or(&config.default_location))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    log::info!("🚀 Starting verstboard");
    log::info!("   Database: {}", config.db_path);
    log::info!("   Default location: {}", config.default_location);

    let store = SqliteRecordStore::open(&config.db_path)
        .with_context(|| format!("failed to open results database {}", config.db_path))?;

    let engine = LeaderboardEngine::new(store);

    match cli.command {
        Command::Leaderboard {
            location,
            event_number,
            year,
            season,
            month,
            current_season,
            facet,
            page,
        } => {
            let season = season.as_deref().and_then(|token| {
                let parsed = Season::from_token(token);
                if parsed.is_none() {
                    log::warn!("Ignoring unknown season '{}'", token);
                }
                parsed
            });

            let window = TemporalFilter {
                event_number,
                year,
                season,
                month,
                current_season,
            };
            let mut query = LeaderboardQuery::new(scope(&location, &config))
                .with_window(window)
                .with_page(page);
            if let Some(facet) = facet {
                query = query.with_facet(facet);
            }

            let today = Local::now().date_naive();
            let response = engine.leaderboard(&query, today)?;
            log::info!(
                "✅ {} participants, page {}/{}",
                response.total_participants,
                response.page,
                response.total_pages
            );
            print_json(&response)
        }
        Command::Medals { name, location } => {
            let awards = engine.medal_history(&scope(&location, &config), &name)?;
            if awards.is_empty() {
                log::info!("No medals found for {}", name);
            }
            print_json(&awards)
        }
        Command::Years { location } => {
            print_json(&engine.available_years(&scope(&location, &config))?)
        }
        Command::Races { location } => {
            print_json(&engine.event_dates(&scope(&location, &config))?)
        }
        Command::AgeGroups { location } => {
            print_json(&engine.age_group_keys(&scope(&location, &config))?)
        }
        Command::Search { query } => print_json(&engine.search_runners(&query)?),
        Command::Locations => print_json(&engine.source().load_locations_with_races()?),
    }
}
