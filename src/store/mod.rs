//! Record sources feeding the leaderboard engine
//!
//! The engine only needs [`RecordSource::list_records`]. A source either
//! returns the complete record set for the scope or fails; it never hands
//! back a partial set.

pub mod sqlite;

pub use sqlite::{Location, SqliteRecordStore};

use crate::leaderboard::LocationScope;
use crate::records::EventRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait RecordSource {
    /// Every stored record for the scope; order is not significant
    fn list_records(&self, scope: &LocationScope) -> Result<Vec<EventRecord>, StoreError>;
}

/// In-memory records, used by tests and callers that already hold a result set
impl RecordSource for [EventRecord] {
    fn list_records(&self, scope: &LocationScope) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self
            .iter()
            .filter(|record| scope.contains(&record.location_id))
            .cloned()
            .collect())
    }
}

impl RecordSource for Vec<EventRecord> {
    fn list_records(&self, scope: &LocationScope) -> Result<Vec<EventRecord>, StoreError> {
        self.as_slice().list_records(scope)
    }
}
