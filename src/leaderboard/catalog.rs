//! Lookup lists over a record set: years, event dates, age groups, runner search

use super::aggregate::AgeGroupFacet;
use crate::records::{EventRecord, RunnerEntry};
use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDate {
    pub number: u32,
    pub date: String,
}

/// Years with at least one event, newest first
pub fn available_years(records: &[EventRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records
        .iter()
        .filter_map(EventRecord::parsed_date)
        .map(|date| date.year())
        .collect();
    years.into_iter().rev().collect()
}

/// Numbered events, highest number first
pub fn event_dates(records: &[EventRecord]) -> Vec<EventDate> {
    let mut dates: Vec<EventDate> = records
        .iter()
        .filter(|record| record.event_number > 0)
        .map(|record| EventDate {
            number: record.event_number,
            date: record.date.clone(),
        })
        .collect();
    dates.sort_by(|a, b| b.number.cmp(&a.number));
    dates
}

/// Facet keys seen on runners with both a known gender and an age group
pub fn age_group_keys(records: &[EventRecord]) -> Vec<String> {
    let keys: BTreeSet<String> = records
        .iter()
        .flat_map(|record| &record.runners)
        .filter(|runner| runner.gender.is_known())
        .filter_map(|runner| {
            runner
                .age_group()
                .map(|group| AgeGroupFacet::new(runner.gender, group).key())
        })
        .collect();
    keys.into_iter().collect()
}

/// Runners whose id or name contains `query`, one entry per id
pub fn search_runners(records: &[EventRecord], query: &str) -> Vec<RunnerEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|record| &record.runners)
        .filter(|runner| {
            let Some(id) = runner.participant_id() else {
                return false;
            };
            id.to_string().contains(&needle) || runner.name.to_lowercase().contains(&needle)
        })
        .filter(|runner| runner.participant_id().is_some_and(|id| seen.insert(id)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{EventResults, Gender};

    fn runner(id: u64, name: &str, gender: Gender, age_group: Option<&str>) -> RunnerEntry {
        RunnerEntry {
            id: Some(id),
            name: name.to_string(),
            raw_score: 0.0,
            duration_seconds: Some(1500),
            gender,
            age_group: age_group.map(str::to_string),
            overall_rank: None,
            gender_rank: None,
        }
    }

    fn record(date: &str, number: u32, runners: Vec<RunnerEntry>) -> EventRecord {
        EventRecord::new(date, "korolev", number, EventResults { runners, volunteers: vec![] })
    }

    #[test]
    fn test_available_years() {
        let records = vec![
            record("01.06.2023", 1, vec![]),
            record("bad", 2, vec![]),
            record("01.06.2024", 3, vec![]),
            record("08.06.2024", 4, vec![]),
        ];
        assert_eq!(available_years(&records), vec![2024, 2023]);
    }

    #[test]
    fn test_event_dates_skip_unnumbered() {
        let records = vec![
            record("01.06.2024", 3, vec![]),
            record("08.06.2024", 0, vec![]),
            record("15.06.2024", 5, vec![]),
        ];
        let dates = event_dates(&records);
        assert_eq!(
            dates.iter().map(|d| d.number).collect::<Vec<_>>(),
            vec![5, 3]
        );
    }

    #[test]
    fn test_age_group_keys() {
        let records = vec![record(
            "01.06.2024",
            1,
            vec![
                runner(1, "A", Gender::Male, Some("40-44")),
                runner(2, "B", Gender::Female, Some("35-39")),
                runner(3, "C", Gender::Male, Some("40-44")),
                runner(4, "D", Gender::Unknown, Some("20-24")),
                runner(5, "E", Gender::Female, None),
            ],
        )];
        assert_eq!(age_group_keys(&records), vec!["Ж35-39", "М40-44"]);
    }

    #[test]
    fn test_search_by_name_or_id() {
        let records = vec![
            record("01.06.2024", 1, vec![runner(7901, "Иван ПЕТРОВ", Gender::Male, None)]),
            record("08.06.2024", 2, vec![
                runner(7901, "Иван Петров", Gender::Male, None),
                runner(1234, "Анна", Gender::Female, None),
            ]),
        ];

        let by_name = search_runners(&records, "петров");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Иван ПЕТРОВ");

        let by_id = search_runners(&records, "123");
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].participant_id(), Some(1234));

        assert!(search_runners(&records, "  ").is_empty());
    }
}
