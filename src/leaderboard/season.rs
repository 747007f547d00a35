//! Calendar seasons used by the temporal filter

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "зима",
            Season::Spring => "весна",
            Season::Summer => "лето",
            Season::Autumn => "осень",
        }
    }

    /// Season tokens are matched verbatim
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "зима" => Some(Season::Winter),
            "весна" => Some(Season::Spring),
            "лето" => Some(Season::Summer),
            "осень" => Some(Season::Autumn),
            _ => None,
        }
    }

    pub fn months(&self) -> [u32; 3] {
        match self {
            Season::Winter => [12, 1, 2],
            Season::Spring => [3, 4, 5],
            Season::Summer => [6, 7, 8],
            Season::Autumn => [9, 10, 11],
        }
    }

    pub fn all() -> [Season; 4] {
        [Season::Winter, Season::Spring, Season::Summer, Season::Autumn]
    }

    pub fn contains_month(&self, month: u32) -> bool {
        self.months().contains(&month)
    }

    pub fn containing(month: u32) -> Option<Self> {
        Season::all()
            .into_iter()
            .find(|season| season.contains_month(month))
    }

    /// Winter of `year` is the preceding December plus January and February
    pub fn is_winter_of(year: i32, date: NaiveDate) -> bool {
        (date.year() == year && matches!(date.month(), 1 | 2))
            || (date.year() == year - 1 && date.month() == 12)
    }
}
