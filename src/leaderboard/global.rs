//! All-locations ranking with fixed-size pages

use super::aggregate::ParticipantStanding;
use super::ranking::compare_best_time;
use serde::Serialize;

pub const PAGE_SIZE: usize = 1000;

/// One page of the global ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardPage {
    /// 1-indexed
    pub page: usize,
    pub total_pages: usize,
    pub total_participants: usize,
    pub entries: Vec<ParticipantStanding>,
}

pub fn total_pages(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Best time ascending with missing times last; ties go to the higher score
pub fn sort_global(standings: &mut [ParticipantStanding]) {
    standings.sort_by(|a, b| {
        compare_best_time(a.best_time_seconds, b.best_time_seconds)
            .then_with(|| b.total_score.total_cmp(&a.total_score))
    });
}

/// Slice an already sorted population; pages outside the range are empty
pub fn paginate(sorted: &[ParticipantStanding], page: usize) -> LeaderboardPage {
    let total_participants = sorted.len();
    let entries = match page.checked_sub(1) {
        Some(index) => sorted
            .iter()
            .skip(index.saturating_mul(PAGE_SIZE))
            .take(PAGE_SIZE)
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    LeaderboardPage {
        page,
        total_pages: total_pages(total_participants),
        total_participants,
        entries,
    }
}

/// Rank the whole population in place and return the requested page
///
/// `standings` stays sorted afterwards so callers can summarise all of it.
pub fn rank_page(standings: &mut [ParticipantStanding], page: usize) -> LeaderboardPage {
    sort_global(standings);
    let result = paginate(standings, page);
    log::debug!(
        "Global ranking: page {}/{} with {} of {} participants",
        result.page,
        result.total_pages,
        result.entries.len(),
        result.total_participants
    );
    result
}
