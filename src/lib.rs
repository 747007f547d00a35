pub mod config;
pub mod leaderboard;
pub mod records;
pub mod store;

pub use config::AppConfig;
pub use leaderboard::{LeaderboardEngine, LeaderboardQuery, LeaderboardResponse};
pub use records::{EventRecord, EventResults, Gender, RunnerEntry, VolunteerEntry};
pub use store::{RecordSource, SqliteRecordStore, StoreError};
