//! Per-participant accumulation over event records
//!
//! Every runner and volunteer appearance with an id is folded into one
//! [`ParticipantAggregate`] keyed by that id. Participants keep first-seen
//! order so the same input always produces the same output.

use crate::records::{EventRecord, Gender, Medal, RunnerEntry, VolunteerEntry};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw points for volunteering at an event the participant also ran
pub const VOLUNTEER_WITH_RUN_POINTS: f64 = 5.0;
/// Raw points for volunteering without running
pub const VOLUNTEER_ONLY_POINTS: f64 = 55.0;
/// Raw score is reported divided by this
pub const SCORE_DIVISOR: f64 = 10.0;

pub const RESULTS_BASE_URL: &str = "https://5verst.ru";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid age group facet: {0}")]
pub struct FacetParseError(pub String);

/// Gender + age bracket filter, keyed like `М40-44`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgeGroupFacet {
    pub gender: Gender,
    pub age_group: String,
}

impl AgeGroupFacet {
    pub fn new(gender: Gender, age_group: impl Into<String>) -> Self {
        Self {
            gender,
            age_group: age_group.into(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}{}", self.gender.as_str(), self.age_group)
    }

    pub fn matches(&self, runner: &RunnerEntry) -> bool {
        runner.gender == self.gender && runner.age_group() == Some(self.age_group.as_str())
    }
}

impl FromStr for AgeGroupFacet {
    type Err = FacetParseError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let key = key.trim();
        let mut chars = key.chars();
        let gender = chars
            .next()
            .map(|c| Gender::from_token(c.encode_utf8(&mut [0; 4])))
            .filter(Gender::is_known)
            .ok_or_else(|| FacetParseError(key.to_string()))?;

        let age_group = chars.as_str().trim();
        if age_group.is_empty() {
            return Err(FacetParseError(key.to_string()));
        }

        Ok(Self::new(gender, age_group))
    }
}

impl fmt::Display for AgeGroupFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Fastest run of a participant and where it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestTime {
    pub seconds: u32,
    pub event_number: u32,
    pub date: String,
    pub location_id: String,
}

impl BestTime {
    /// Link to the results page of the event
    pub fn results_link(&self) -> Option<String> {
        if self.location_id.is_empty() || self.date.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}/results/{}/",
            RESULTS_BASE_URL, self.location_id, self.date
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantAggregate {
    pub id: u64,
    pub name: String,
    pub total_raw_score: f64,
    pub run_count: u32,
    pub volunteer_count: u32,
    pub total_time_seconds: u64,
    pub best_time: Option<BestTime>,
    pub gender: Gender,
    pub age_group: Option<String>,
    pub gold_medals: u32,
    pub silver_medals: u32,
    pub bronze_medals: u32,
}

impl ParticipantAggregate {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            total_raw_score: 0.0,
            run_count: 0,
            volunteer_count: 0,
            total_time_seconds: 0,
            best_time: None,
            gender: Gender::Unknown,
            age_group: None,
            gold_medals: 0,
            silver_medals: 0,
            bronze_medals: 0,
        }
    }

    pub fn record_run(&mut self, record: &EventRecord, runner: &RunnerEntry) {
        self.name.clone_from(&runner.name);
        self.run_count += 1;
        self.total_raw_score += runner.raw_score;
        self.total_time_seconds += u64::from(runner.duration_seconds.unwrap_or(0));

        if let Some(seconds) = runner.duration_seconds {
            let improved = self
                .best_time
                .as_ref()
                .map_or(true, |best| seconds < best.seconds);
            if improved {
                self.best_time = Some(BestTime {
                    seconds,
                    event_number: record.event_number,
                    date: record.date.clone(),
                    location_id: record.location_id.clone(),
                });
            }
        }

        // Age group follows the latest appearance, gender sticks to the first known one
        if let Some(group) = runner.age_group() {
            self.age_group = Some(group.to_string());
        }
        if !self.gender.is_known() && runner.gender.is_known() {
            self.gender = runner.gender;
        }

        match runner.medal() {
            Some(Medal::Gold) => self.gold_medals += 1,
            Some(Medal::Silver) => self.silver_medals += 1,
            Some(Medal::Bronze) => self.bronze_medals += 1,
            None => {}
        }
    }

    pub fn record_volunteer(&mut self, volunteer: &VolunteerEntry, ran_this_event: bool) {
        self.name.clone_from(&volunteer.name);
        self.volunteer_count += 1;
        self.total_raw_score += if ran_this_event {
            VOLUNTEER_WITH_RUN_POINTS
        } else {
            VOLUNTEER_ONLY_POINTS
        };
    }

    pub fn total_score(&self) -> f64 {
        self.total_raw_score / SCORE_DIVISOR
    }

    pub fn finalize(self) -> ParticipantStanding {
        let total_score = self.total_score();
        let best_time_link = self.best_time.as_ref().and_then(BestTime::results_link);
        let (best_time_seconds, best_time_event_number, best_time_date, best_time_location) =
            match self.best_time {
                Some(best) => (
                    Some(best.seconds),
                    Some(best.event_number),
                    Some(best.date),
                    Some(best.location_id),
                ),
                None => (None, None, None, None),
            };

        ParticipantStanding {
            id: self.id,
            name: self.name,
            total_score,
            run_count: self.run_count,
            volunteer_count: self.volunteer_count,
            total_time_seconds: self.total_time_seconds,
            best_time_seconds,
            best_time_event_number,
            best_time_date,
            best_time_location,
            best_time_link,
            gender: self.gender,
            age_group: self.age_group,
            gold_medals: self.gold_medals,
            silver_medals: self.silver_medals,
            bronze_medals: self.bronze_medals,
        }
    }
}

/// Finalized leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantStanding {
    pub id: u64,
    pub name: String,
    pub total_score: f64,
    pub run_count: u32,
    pub volunteer_count: u32,
    pub total_time_seconds: u64,
    pub best_time_seconds: Option<u32>,
    pub best_time_event_number: Option<u32>,
    pub best_time_date: Option<String>,
    pub best_time_location: Option<String>,
    pub best_time_link: Option<String>,
    pub gender: Gender,
    pub age_group: Option<String>,
    pub gold_medals: u32,
    pub silver_medals: u32,
    pub bronze_medals: u32,
}

pub struct ParticipantAggregator {
    participants: IndexMap<u64, ParticipantAggregate>,
    facet: Option<AgeGroupFacet>,
}

impl ParticipantAggregator {
    pub fn new() -> Self {
        Self {
            participants: IndexMap::new(),
            facet: None,
        }
    }

    /// Restrict runners (not volunteers) to one gender and age group
    pub fn with_facet(facet: Option<AgeGroupFacet>) -> Self {
        Self {
            participants: IndexMap::new(),
            facet,
        }
    }

    pub fn add_record(&mut self, record: &EventRecord) {
        // Taken before the facet so volunteers who ran are always recognised
        let runner_ids = record.runner_ids();

        for runner in &record.runners {
            if let Some(ref facet) = self.facet {
                if !facet.matches(runner) {
                    continue;
                }
            }
            let Some(id) = runner.participant_id() else {
                continue;
            };
            self.participants
                .entry(id)
                .or_insert_with(|| ParticipantAggregate::new(id, &runner.name))
                .record_run(record, runner);
        }

        for volunteer in &record.volunteers {
            let Some(id) = volunteer.participant_id() else {
                continue;
            };
            self.participants
                .entry(id)
                .or_insert_with(|| ParticipantAggregate::new(id, &volunteer.name))
                .record_volunteer(volunteer, runner_ids.contains(&id));
        }
    }

    pub fn add_records<'a>(&mut self, records: impl IntoIterator<Item = &'a EventRecord>) {
        for record in records {
            self.add_record(record);
        }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn into_aggregates(self) -> IndexMap<u64, ParticipantAggregate> {
        self.participants
    }

    /// Finalize every participant, in first-seen order
    pub fn into_standings(self) -> Vec<ParticipantStanding> {
        self.participants
            .into_values()
            .map(ParticipantAggregate::finalize)
            .collect()
    }
}

impl Default for ParticipantAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold `records` into one aggregate per participant id
pub fn aggregate_participants(
    records: &[EventRecord],
    facet: Option<&AgeGroupFacet>,
) -> IndexMap<u64, ParticipantAggregate> {
    let mut aggregator = ParticipantAggregator::with_facet(facet.cloned());
    aggregator.add_records(records);
    log::debug!(
        "Aggregated {} records into {} participants",
        records.len(),
        aggregator.len()
    );
    aggregator.into_aggregates()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::EventResults;

    fn runner(id: u64, name: &str, score: f64, time: Option<u32>, gender: Gender) -> RunnerEntry {
        RunnerEntry {
            id: Some(id),
            name: name.to_string(),
            raw_score: score,
            duration_seconds: time,
            gender,
            age_group: None,
            overall_rank: None,
            gender_rank: None,
        }
    }

    fn volunteer(id: u64, name: &str) -> VolunteerEntry {
        VolunteerEntry {
            id: Some(id),
            name: name.to_string(),
        }
    }

    fn event(
        date: &str,
        number: u32,
        runners: Vec<RunnerEntry>,
        volunteers: Vec<VolunteerEntry>,
    ) -> EventRecord {
        EventRecord::new(date, "korolev", number, EventResults { runners, volunteers })
    }

    #[test]
    fn test_end_to_end_example() {
        let mut first = runner(1, "A", 500.0, Some(1200), Gender::Male);
        first.overall_rank = Some(1);
        let records = vec![event("01.06.2024", 7, vec![first], vec![volunteer(2, "B")])];

        let participants = aggregate_participants(&records, None);
        assert_eq!(participants.len(), 2);

        let a = participants[&1].clone().finalize();
        assert_eq!(a.total_score, 50.0);
        assert_eq!(a.gold_medals, 1);
        assert_eq!(a.best_time_seconds, Some(1200));
        assert_eq!(a.best_time_event_number, Some(7));
        assert_eq!(
            a.best_time_link.as_deref(),
            Some("https://5verst.ru/korolev/results/01.06.2024/")
        );

        let b = participants[&2].clone().finalize();
        assert_eq!(b.total_score, 5.5);
        assert_eq!(b.volunteer_count, 1);
        assert_eq!(b.best_time_seconds, None);
        assert_eq!(b.best_time_link, None);
    }

    #[test]
    fn test_score_decomposition() {
        // id 1 runs twice, volunteers once while running and once without
        let records = vec![
            event(
                "01.06.2024",
                1,
                vec![runner(1, "A", 60.0, Some(1500), Gender::Male)],
                vec![volunteer(1, "A")],
            ),
            event(
                "08.06.2024",
                2,
                vec![runner(1, "A", 62.5, Some(1450), Gender::Male)],
                vec![],
            ),
            event(
                "15.06.2024",
                3,
                vec![runner(9, "Z", 50.0, Some(1900), Gender::Male)],
                vec![volunteer(1, "A")],
            ),
        ];

        let a = aggregate_participants(&records, None)[&1].clone();
        let expected = (60.0 + 62.5 + VOLUNTEER_WITH_RUN_POINTS + VOLUNTEER_ONLY_POINTS) / 10.0;
        assert!((a.total_score() - expected).abs() < 1e-9);
        assert_eq!(a.run_count, 2);
        assert_eq!(a.volunteer_count, 2);
        assert_eq!(a.total_time_seconds, 2950);
    }

    #[test]
    fn test_best_time_is_minimum_valid_duration() {
        let records = vec![
            event("01.06.2024", 1, vec![runner(1, "A", 0.0, Some(1500), Gender::Male)], vec![]),
            event("08.06.2024", 2, vec![runner(1, "A", 0.0, None, Gender::Male)], vec![]),
            event("15.06.2024", 3, vec![runner(1, "A", 0.0, Some(1400), Gender::Male)], vec![]),
            event("22.06.2024", 4, vec![runner(1, "A", 0.0, Some(1450), Gender::Male)], vec![]),
        ];

        let a = aggregate_participants(&records, None)[&1].clone();
        let best = a.best_time.unwrap();
        assert_eq!(best.seconds, 1400);
        assert_eq!(best.event_number, 3);
        assert_eq!(best.date, "15.06.2024");
        assert_eq!(a.run_count, 4);
    }

    #[test]
    fn test_no_valid_time_stays_absent() {
        let records = vec![event("01.06.2024", 1, vec![runner(1, "A", 10.0, None, Gender::Female)], vec![])];
        let a = aggregate_participants(&records, None)[&1].clone().finalize();
        assert_eq!(a.best_time_seconds, None);
        assert_eq!(a.best_time_date, None);
        assert_eq!(a.total_time_seconds, 0);
    }

    #[test]
    fn test_medals_follow_gender_rank_rules() {
        let mut woman = runner(1, "W", 0.0, Some(1500), Gender::Female);
        woman.overall_rank = Some(1);
        woman.gender_rank = Some(3);
        let mut man = runner(2, "M", 0.0, Some(1200), Gender::Male);
        man.overall_rank = Some(2);
        man.gender_rank = Some(1);
        let mut unknown = runner(3, "U", 0.0, Some(1300), Gender::Unknown);
        unknown.overall_rank = Some(1);

        let records = vec![event("01.06.2024", 1, vec![woman, man, unknown], vec![])];
        let participants = aggregate_participants(&records, None);

        let w = &participants[&1];
        assert_eq!((w.gold_medals, w.silver_medals, w.bronze_medals), (0, 0, 1));
        let m = &participants[&2];
        assert_eq!((m.gold_medals, m.silver_medals, m.bronze_medals), (0, 1, 0));
        let u = &participants[&3];
        assert_eq!(u.gold_medals + u.silver_medals + u.bronze_medals, 0);
    }

    #[test]
    fn test_gender_sticky_age_group_and_name_latest() {
        let mut first = runner(1, "Old Name", 0.0, Some(1500), Gender::Unknown);
        first.age_group = Some("30-34".to_string());
        let mut second = runner(1, "Mid Name", 0.0, Some(1500), Gender::Female);
        second.age_group = Some("35-39".to_string());
        let mut third = runner(1, "New Name", 0.0, Some(1500), Gender::Male);
        third.age_group = None;

        let records = vec![
            event("01.06.2024", 1, vec![first], vec![]),
            event("08.06.2024", 2, vec![second], vec![]),
            event("15.06.2024", 3, vec![third], vec![]),
        ];

        let a = &aggregate_participants(&records, None)[&1];
        assert_eq!(a.gender, Gender::Female);
        assert_eq!(a.age_group.as_deref(), Some("35-39"));
        assert_eq!(a.name, "New Name");
    }

    #[test]
    fn test_entries_without_id_are_ignored() {
        let mut anonymous = runner(0, "Неизвестный", 70.0, Some(1000), Gender::Male);
        anonymous.id = None;
        let records = vec![event(
            "01.06.2024",
            1,
            vec![anonymous, runner(0, "Zero", 1.0, Some(900), Gender::Male)],
            vec![VolunteerEntry { id: None, name: "V".to_string() }],
        )];

        assert!(aggregate_participants(&records, None).is_empty());
    }

    #[test]
    fn test_facet_filters_runners_not_volunteers() {
        let mut target = runner(1, "A", 50.0, Some(1500), Gender::Female);
        target.age_group = Some("40-44".to_string());
        let mut other = runner(2, "B", 50.0, Some(1400), Gender::Female);
        other.age_group = Some("45-49".to_string());

        let records = vec![event(
            "01.06.2024",
            1,
            vec![target, other],
            vec![volunteer(2, "B"), volunteer(3, "C")],
        )];

        let facet: AgeGroupFacet = "Ж40-44".parse().unwrap();
        let participants = aggregate_participants(&records, Some(&facet));

        assert_eq!(participants.len(), 3);
        assert_eq!(participants[&1].run_count, 1);
        // B was filtered out as a runner but still counts as having run this event
        assert_eq!(participants[&2].run_count, 0);
        assert_eq!(participants[&2].total_raw_score, VOLUNTEER_WITH_RUN_POINTS);
        assert_eq!(participants[&3].total_raw_score, VOLUNTEER_ONLY_POINTS);
    }

    #[test]
    fn test_facet_parsing() {
        let facet: AgeGroupFacet = "М40-44".parse().unwrap();
        assert_eq!(facet.gender, Gender::Male);
        assert_eq!(facet.age_group, "40-44");
        assert_eq!(facet.key(), "М40-44");

        assert!("X40-44".parse::<AgeGroupFacet>().is_err());
        assert!("Ж".parse::<AgeGroupFacet>().is_err());
        assert!("".parse::<AgeGroupFacet>().is_err());

        let err = "Н/Д40-44".parse::<AgeGroupFacet>().unwrap_err();
        assert_eq!(err, FacetParseError("Н/Д40-44".to_string()));
        assert_eq!(err.to_string(), "Invalid age group facet: Н/Д40-44");
    }

    #[test]
    fn test_idempotent() {
        let mut a = runner(1, "A", 55.0, Some(1500), Gender::Male);
        a.overall_rank = Some(2);
        let records = vec![
            event("01.06.2024", 1, vec![a.clone(), runner(2, "B", 40.0, None, Gender::Female)], vec![volunteer(3, "C")]),
            event("08.06.2024", 2, vec![a], vec![volunteer(2, "B")]),
        ];

        let first = aggregate_participants(&records, None);
        let second = aggregate_participants(&records, None);
        assert_eq!(first, second);
        assert_eq!(
            first.keys().copied().collect::<Vec<_>>(),
            second.keys().copied().collect::<Vec<_>>()
        );
    }
}
