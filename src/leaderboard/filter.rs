//! Temporal filtering of event records
//!
//! An event number selects a single event and overrides every other time
//! filter. Otherwise year, season and month are applied together, with the
//! winter season reaching back into the previous December.

use super::season::Season;
use crate::records::EventRecord;
use chrono::{Datelike, NaiveDate};

/// Which locations a request covers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocationScope {
    All,
    Location(String),
}

impl LocationScope {
    /// Sentinel accepted from callers for the all-locations scope
    pub const ALL_TOKEN: &'static str = "all";

    pub fn from_token(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s == Self::ALL_TOKEN {
            LocationScope::All
        } else {
            LocationScope::Location(s.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LocationScope::All => Self::ALL_TOKEN,
            LocationScope::Location(id) => id,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, LocationScope::All)
    }

    pub fn contains(&self, location_id: &str) -> bool {
        match self {
            LocationScope::All => true,
            LocationScope::Location(id) => id == location_id,
        }
    }
}

/// Time and identity window requested by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalFilter {
    pub event_number: Option<u32>,
    pub year: Option<i32>,
    pub season: Option<Season>,
    pub month: Option<u32>,
    /// Replace year and season with the ones containing today
    pub current_season: bool,
}

impl TemporalFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_number(mut self, event_number: u32) -> Self {
        self.event_number = Some(event_number);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn current_season(mut self) -> Self {
        self.current_season = true;
        self
    }

    fn event_number(&self) -> Option<u32> {
        self.event_number.filter(|number| *number != 0)
    }

    /// True when no filter narrows the record set
    pub fn is_unfiltered(&self) -> bool {
        self.event_number().is_none()
            && self.year.is_none()
            && self.season.is_none()
            && self.month.is_none()
            && !self.current_season
    }

    /// Keep the records inside the window; `today` drives current-season mode
    pub fn apply(&self, mut records: Vec<EventRecord>, today: NaiveDate) -> Vec<EventRecord> {
        let before = records.len();

        match self.event_number() {
            Some(number) => records.retain(|record| record.event_number == number),
            None => {
                let window = self.date_window(today);
                if !window.is_open() {
                    records.retain(|record| window.matches(record));
                }
            }
        }

        log::debug!(
            "Temporal filter {:?} kept {} of {} records",
            self,
            records.len(),
            before
        );
        records
    }

    fn date_window(&self, today: NaiveDate) -> DateWindow {
        let (year, season) = if self.current_season {
            (Some(today.year()), Season::containing(today.month()))
        } else {
            (self.year, self.season)
        };

        DateWindow {
            year,
            season,
            month: self.month,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DateWindow {
    year: Option<i32>,
    season: Option<Season>,
    month: Option<u32>,
}

impl DateWindow {
    fn is_open(&self) -> bool {
        self.year.is_none() && self.season.is_none() && self.month.is_none()
    }

    /// Records with an unparsable date never match a date window
    fn matches(&self, record: &EventRecord) -> bool {
        match record.parsed_date() {
            Some(date) => self.contains(date),
            None => false,
        }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        let in_period = match (self.year, self.season) {
            (Some(year), Some(Season::Winter)) => Season::is_winter_of(year, date),
            (year, season) => {
                year.map_or(true, |year| date.year() == year)
                    && season.map_or(true, |season| season.contains_month(date.month()))
            }
        };

        in_period && self.month.map_or(true, |month| date.month() == month)
    }
}
