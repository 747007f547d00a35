//! Leaderboard ordering and summary metadata

use super::aggregate::{AgeGroupFacet, ParticipantStanding};
use crate::records::{parse_event_date, EventRecord, Gender};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Total score, highest first
    ByScore,
    /// Best time, fastest first, participants without a time last
    ByBestTime,
}

impl RankingMode {
    /// Age group views compare runners by pace, everything else by score
    pub fn for_facet(facet: Option<&AgeGroupFacet>) -> Self {
        match facet {
            Some(_) => RankingMode::ByBestTime,
            None => RankingMode::ByScore,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMode::ByScore => "score",
            RankingMode::ByBestTime => "best_time",
        }
    }

    /// Stable sort; equal keys keep their input order
    pub fn sort(&self, standings: &mut [ParticipantStanding]) {
        match self {
            RankingMode::ByScore => {
                standings.sort_by(|a, b| b.total_score.total_cmp(&a.total_score))
            }
            RankingMode::ByBestTime => standings
                .sort_by(|a, b| compare_best_time(a.best_time_seconds, b.best_time_seconds)),
        }
    }
}

/// Ascending, with a missing time greater than any real one
pub fn compare_best_time(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FastestRun {
    pub name: String,
    pub time: u32,
    pub event_number: u32,
    pub date: String,
    pub location: String,
    /// Whole days between the run and today
    pub record_age_days: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeaderboardMetadata {
    pub top_male: Option<String>,
    pub top_female: Option<String>,
    pub overall_fastest: Option<FastestRun>,
}

/// First sorted participant of the given gender
pub fn top_of_gender(leaderboard: &[ParticipantStanding], gender: Gender) -> Option<String> {
    leaderboard
        .iter()
        .find(|standing| standing.gender == gender)
        .map(|standing| standing.name.clone())
}

/// Fastest single run across every runner entry in `records`
///
/// Scans raw entries, so anonymous runners and runners outside an active age
/// group facet are candidates too. The first of equal times wins.
pub fn overall_fastest(records: &[EventRecord], today: NaiveDate) -> Option<FastestRun> {
    let mut fastest: Option<(&EventRecord, &str, u32)> = None;

    for record in records {
        for runner in &record.runners {
            let Some(time) = runner.duration_seconds else {
                continue;
            };
            if fastest.map_or(true, |(_, _, best)| time < best) {
                fastest = Some((record, runner.name.as_str(), time));
            }
        }
    }

    fastest.map(|(record, name, time)| FastestRun {
        name: name.to_string(),
        time,
        event_number: record.event_number,
        date: record.date.clone(),
        location: record.location_id.clone(),
        record_age_days: parse_event_date(&record.date)
            .map(|date| today.signed_duration_since(date).num_days()),
    })
}

/// Summary block for an ordered leaderboard built from `records`
pub fn build_metadata(
    records: &[EventRecord],
    leaderboard: &[ParticipantStanding],
    today: NaiveDate,
) -> LeaderboardMetadata {
    LeaderboardMetadata {
        top_male: top_of_gender(leaderboard, Gender::Male),
        top_female: top_of_gender(leaderboard, Gender::Female),
        overall_fastest: overall_fastest(records, today),
    }
}
