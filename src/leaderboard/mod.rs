//! Leaderboard Engine - participant aggregation and ranking
//!
//! Turns stored event records into ranked, scored participant standings.
//!
//! # Architecture
//!
//! ```text
//! RecordSource (SQLite / in-memory) → TemporalFilter (event number, year, season, month)
//!     ↓
//! ParticipantAggregator (runs, volunteering, best time, medals)
//!     ↓
//! RankingMode::sort (score, or best time for age group views)
//!     ↓                          ↘ global::rank_page (all locations, best time, 1000 per page)
//! build_metadata (top male/female, overall fastest, record age)
//! ```
//!
//! Every call builds its own participant map and returns it by value, so
//! concurrent requests share nothing but the record source.

pub mod aggregate;
pub mod catalog;
pub mod engine;
pub mod filter;
pub mod global;
pub mod medals;
pub mod ranking;
pub mod season;

pub use aggregate::{
    aggregate_participants, AgeGroupFacet, BestTime, FacetParseError, ParticipantAggregate,
    ParticipantAggregator, ParticipantStanding,
};
pub use catalog::EventDate;
pub use engine::{
    compute_leaderboard, LeaderboardEngine, LeaderboardError, LeaderboardQuery,
    LeaderboardResponse,
};
pub use filter::{LocationScope, TemporalFilter};
pub use global::{LeaderboardPage, PAGE_SIZE};
pub use medals::{medal_history, MedalAward};
pub use ranking::{FastestRun, LeaderboardMetadata, RankingMode};
pub use season::Season;
