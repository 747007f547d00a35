//! SQLite-backed results store
//!
//! Each event is one `race_results` row keyed by `(race_date, location_slug)`
//! with the runner/volunteer lists kept as a JSON payload in `data`.

use super::{RecordSource, StoreError};
use crate::leaderboard::LocationScope;
use crate::records::{EventRecord, EventResults};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS race_results (
    race_date     TEXT NOT NULL,
    location_slug TEXT NOT NULL,
    data          TEXT,
    race_number   INTEGER,
    PRIMARY KEY (race_date, location_slug)
);
CREATE TABLE IF NOT EXISTS locations (
    slug TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    url  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_race_number ON race_results (race_number);
CREATE INDEX IF NOT EXISTS idx_location ON race_results (location_slug);
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub slug: String,
    pub name: String,
    pub url: String,
}

pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Open (or create) the database file and ensure the schema exists
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self {
            conn: Connection::open(db_path)?,
        };
        store.init_schema()?;
        log::debug!("📥 Opened results store: {}", db_path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Idempotent; every statement uses IF NOT EXISTS
    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn save_locations(&mut self, locations: &[Location]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO locations (slug, name, url) VALUES (?1, ?2, ?3)",
            )?;
            for location in locations {
                stmt.execute(params![location.slug, location.name, location.url])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn load_locations(&self) -> Result<Vec<Location>, StoreError> {
        self.query_locations("SELECT slug, name, url FROM locations ORDER BY name")
    }

    /// Locations that have at least one stored event
    pub fn load_locations_with_races(&self) -> Result<Vec<Location>, StoreError> {
        self.query_locations(
            "SELECT DISTINCT l.slug, l.name, l.url
             FROM locations l
             INNER JOIN race_results r ON l.slug = r.location_slug
             ORDER BY l.name",
        )
    }

    fn query_locations(&self, sql: &str) -> Result<Vec<Location>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(Location {
                slug: row.get(0)?,
                name: row.get(1)?,
                url: row.get(2)?,
            })
        })?;

        let mut locations = Vec::new();
        for location in rows {
            locations.push(location?);
        }
        Ok(locations)
    }

    /// Insert or replace the results of one event
    pub fn save_results(
        &self,
        race_date: &str,
        location_slug: &str,
        race_number: u32,
        results: &EventResults,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(results)?;
        self.conn.execute(
            "INSERT INTO race_results (race_date, location_slug, race_number, data)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(race_date, location_slug) DO UPDATE SET
                 race_number = excluded.race_number,
                 data = excluded.data",
            params![race_date, location_slug, race_number, payload],
        )?;
        Ok(())
    }

    /// Stored results of one event; `None` if missing or undecodable
    pub fn load_results(
        &self,
        race_date: &str,
        location_slug: &str,
    ) -> Result<Option<EventResults>, StoreError> {
        let payload: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT data FROM race_results WHERE race_date = ?1 AND location_slug = ?2",
                params![race_date, location_slug],
                |row| row.get(0),
            )
            .optional()?;

        Ok(payload
            .flatten()
            .and_then(|payload| serde_json::from_str(&payload).ok()))
    }

    pub fn record_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM race_results", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl RecordSource for SqliteRecordStore {
    /// Newest first by stored date text; rows without a decodable payload are skipped
    fn list_records(&self, scope: &LocationScope) -> Result<Vec<EventRecord>, StoreError> {
        let mut stmt = match scope {
            LocationScope::All => self.conn.prepare(
                "SELECT race_date, race_number, data, location_slug
                 FROM race_results ORDER BY race_date DESC",
            )?,
            LocationScope::Location(_) => self.conn.prepare(
                "SELECT race_date, race_number, data, location_slug
                 FROM race_results WHERE location_slug = ?1 ORDER BY race_date DESC",
            )?,
        };

        type StoredRow = (String, Option<i64>, Option<String>, String);
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<StoredRow> {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        };
        let rows = match scope {
            LocationScope::All => stmt.query_map([], map_row)?,
            LocationScope::Location(slug) => stmt.query_map([slug], map_row)?,
        };

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in rows {
            let (race_date, race_number, data, location_slug) = row?;
            let Some(data) = data else {
                skipped += 1;
                continue;
            };
            match EventResults::from_json(&data) {
                Ok(results) => {
                    let number = race_number
                        .and_then(|n| u32::try_from(n).ok())
                        .unwrap_or(0);
                    records.push(EventRecord::new(race_date, location_slug, number, results));
                }
                Err(e) => {
                    log::warn!(
                        "Could not decode results for {} at {}: {}",
                        race_date,
                        location_slug,
                        e
                    );
                    skipped += 1;
                }
            }
        }

        log::debug!(
            "📥 Loaded {} records for {} ({} skipped)",
            records.len(),
            scope.as_str(),
            skipped
        );
        Ok(records)
    }
}
