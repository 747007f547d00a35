//! Event result records as stored by the results collector
//!
//! One [`EventRecord`] holds the full runner and volunteer lists of a single
//! event at one location on one date. The `runners`/`volunteers` payload is
//! persisted as JSON, so field names here match the stored keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;

/// Date format used by event pages and the storage layer (`01.06.2024`)
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Parse a stored event date, `None` if it is malformed
pub fn parse_event_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "М",
            Gender::Female => "Ж",
            Gender::Unknown => "Н/Д",
        }
    }

    /// Any token other than the two gender letters maps to `Unknown`
    pub fn from_token(s: &str) -> Self {
        match s.trim() {
            "М" => Gender::Male,
            "Ж" => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Gender::Unknown)
    }
}

impl From<String> for Gender {
    fn from(s: String) -> Self {
        Gender::from_token(&s)
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        gender.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn from_rank(rank: Option<u32>) -> Option<Self> {
        match rank? {
            1 => Some(Medal::Gold),
            2 => Some(Medal::Silver),
            3 => Some(Medal::Bronze),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    /// Age-grade percentage as published on the results page
    #[serde(rename = "score", default)]
    pub raw_score: f64,
    #[serde(rename = "time_in_seconds", default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub overall_rank: Option<u32>,
    /// Rank among female finishers of the event
    #[serde(default)]
    pub gender_rank: Option<u32>,
}

impl RunnerEntry {
    /// Participant identity; a missing or zero id means the entry is anonymous
    pub fn participant_id(&self) -> Option<u64> {
        self.id.filter(|id| *id != 0)
    }

    /// Men are ranked by overall place, women by their place among women
    pub fn medal(&self) -> Option<Medal> {
        match self.gender {
            Gender::Male => Medal::from_rank(self.overall_rank),
            Gender::Female => Medal::from_rank(self.gender_rank),
            Gender::Unknown => None,
        }
    }

    /// Rank that earned (or would earn) the medal for this entry
    pub fn medal_rank(&self) -> Option<u32> {
        match self.gender {
            Gender::Female if self.gender_rank.is_some() => self.gender_rank,
            _ => self.overall_rank,
        }
    }

    pub fn age_group(&self) -> Option<&str> {
        self.age_group.as_deref().filter(|group| !group.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolunteerEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
}

impl VolunteerEntry {
    pub fn participant_id(&self) -> Option<u64> {
        self.id.filter(|id| *id != 0)
    }
}

/// The `data` payload stored per event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventResults {
    #[serde(default)]
    pub runners: Vec<RunnerEntry>,
    #[serde(default)]
    pub volunteers: Vec<VolunteerEntry>,
}

impl EventResults {
    pub fn from_json(payload: &str) -> Result<Self, Box<dyn Error>> {
        let results: EventResults = serde_json::from_str(payload)?;
        Ok(results)
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty() && self.volunteers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub date: String,
    pub location_id: String,
    /// 0 when the event number is unknown
    pub event_number: u32,
    pub runners: Vec<RunnerEntry>,
    pub volunteers: Vec<VolunteerEntry>,
}

impl EventRecord {
    pub fn new(
        date: impl Into<String>,
        location_id: impl Into<String>,
        event_number: u32,
        results: EventResults,
    ) -> Self {
        Self {
            date: date.into(),
            location_id: location_id.into(),
            event_number,
            runners: results.runners,
            volunteers: results.volunteers,
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_event_date(&self.date)
    }

    /// Ids of everyone who ran this event
    pub fn runner_ids(&self) -> HashSet<u64> {
        self.runners
            .iter()
            .filter_map(RunnerEntry::participant_id)
            .collect()
    }
}
