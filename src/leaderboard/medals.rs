//! Medal history lookup for a single runner by name

use crate::records::{parse_event_date, EventRecord, Medal};
use serde::Serialize;
use std::cmp::Reverse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedalAward {
    pub date: String,
    pub event_number: u32,
    pub location: String,
    pub medal: Medal,
    pub rank: Option<u32>,
}

/// Every medal won by runners named `runner_name` (case-insensitive), newest first
///
/// Only the first matching entry of each event is considered.
pub fn medal_history(records: &[EventRecord], runner_name: &str) -> Vec<MedalAward> {
    let wanted = runner_name.trim().to_uppercase();
    let mut awards: Vec<MedalAward> = records
        .iter()
        .filter_map(|record| {
            let runner = record
                .runners
                .iter()
                .find(|runner| runner.name.to_uppercase() == wanted)?;
            let medal = runner.medal()?;
            Some(MedalAward {
                date: record.date.clone(),
                event_number: record.event_number,
                location: record.location_id.clone(),
                medal,
                rank: runner.medal_rank(),
            })
        })
        .collect();

    // Unparsable dates sort after every real date
    awards.sort_by_key(|award| match parse_event_date(&award.date) {
        Some(date) => (false, Reverse(Some(date))),
        None => (true, Reverse(None)),
    });

    log::debug!("Found {} medals for {}", awards.len(), runner_name);
    awards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{EventResults, Gender, RunnerEntry};

    fn runner(name: &str, gender: Gender, overall: u32, gender_rank: Option<u32>) -> RunnerEntry {
        RunnerEntry {
            id: Some(1),
            name: name.to_string(),
            raw_score: 0.0,
            duration_seconds: Some(1500),
            gender,
            age_group: None,
            overall_rank: Some(overall),
            gender_rank,
        }
    }

    fn record(date: &str, number: u32, runners: Vec<RunnerEntry>) -> EventRecord {
        EventRecord::new(date, "korolev", number, EventResults { runners, volunteers: vec![] })
    }

    #[test]
    fn test_history_newest_first() {
        let records = vec![
            record("01.06.2024", 10, vec![runner("Мария ИВАНОВА", Gender::Female, 5, Some(1))]),
            record("15.06.2024", 12, vec![runner("мария иванова", Gender::Female, 3, Some(2))]),
            record("08.06.2024", 11, vec![runner("Мария Иванова", Gender::Female, 2, Some(4))]),
        ];

        let awards = medal_history(&records, "МАРИЯ ИВАНОВА");
        assert_eq!(awards.len(), 2);
        assert_eq!(awards[0].date, "15.06.2024");
        assert_eq!(awards[0].medal, Medal::Silver);
        assert_eq!(awards[0].rank, Some(2));
        assert_eq!(awards[1].event_number, 10);
        assert_eq!(awards[1].medal, Medal::Gold);
    }

    #[test]
    fn test_only_first_match_per_event() {
        let records = vec![record(
            "01.06.2024",
            1,
            vec![
                runner("Пётр", Gender::Male, 7, None),
                runner("Пётр", Gender::Male, 1, None),
            ],
        )];

        assert!(medal_history(&records, "пётр").is_empty());
    }

    #[test]
    fn test_male_rank_is_overall() {
        let records = vec![record("01.06.2024", 1, vec![runner("Пётр", Gender::Male, 3, Some(1))])];
        let awards = medal_history(&records, "Пётр");
        assert_eq!(awards[0].medal, Medal::Bronze);
        assert_eq!(awards[0].rank, Some(3));
    }
}
