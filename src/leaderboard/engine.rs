//! Request-level orchestration: list, filter, aggregate, rank

use super::aggregate::{AgeGroupFacet, ParticipantAggregator, ParticipantStanding};
use super::catalog::{self, EventDate};
use super::filter::{LocationScope, TemporalFilter};
use super::global;
use super::medals::{self, MedalAward};
use super::ranking::{build_metadata, LeaderboardMetadata, RankingMode};
use crate::records::{EventRecord, RunnerEntry};
use crate::store::{RecordSource, StoreError};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("Record source failed: {0}")]
    Source(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub scope: LocationScope,
    pub window: TemporalFilter,
    pub facet: Option<AgeGroupFacet>,
    /// 1-indexed; only the global ranking is paged
    pub page: usize,
}

impl LeaderboardQuery {
    pub fn new(scope: LocationScope) -> Self {
        Self {
            scope,
            window: TemporalFilter::default(),
            facet: None,
            page: 1,
        }
    }

    pub fn with_window(mut self, window: TemporalFilter) -> Self {
        self.window = window;
        self
    }

    pub fn with_facet(mut self, facet: AgeGroupFacet) -> Self {
        self.facet = Some(facet);
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// All locations with no time window goes through the paged global ranking
    pub fn is_global(&self) -> bool {
        self.scope.is_all() && self.window.is_unfiltered()
    }

    pub fn ranking_mode(&self) -> RankingMode {
        if self.is_global() {
            RankingMode::ByBestTime
        } else {
            RankingMode::for_facet(self.facet.as_ref())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<ParticipantStanding>,
    pub ranking_mode: RankingMode,
    pub page: usize,
    pub total_pages: usize,
    pub total_participants: usize,
    pub metadata: LeaderboardMetadata,
}

/// Build the leaderboard for `query` from an already listed record set
pub fn compute_leaderboard(
    records: Vec<EventRecord>,
    query: &LeaderboardQuery,
    today: NaiveDate,
) -> LeaderboardResponse {
    let records = query.window.apply(records, today);

    let mut aggregator = ParticipantAggregator::with_facet(query.facet.clone());
    aggregator.add_records(&records);
    let mut standings = aggregator.into_standings();

    let ranking_mode = query.ranking_mode();
    if query.is_global() {
        let page = global::rank_page(&mut standings, query.page);
        let metadata = build_metadata(&records, &standings, today);
        return LeaderboardResponse {
            leaderboard: page.entries,
            ranking_mode,
            page: page.page,
            total_pages: page.total_pages,
            total_participants: page.total_participants,
            metadata,
        };
    }

    ranking_mode.sort(&mut standings);
    let metadata = build_metadata(&records, &standings, today);
    let total_participants = standings.len();
    LeaderboardResponse {
        leaderboard: standings,
        ranking_mode,
        page: 1,
        total_pages: 1,
        total_participants,
        metadata,
    }
}

/// Leaderboard queries over a record source
pub struct LeaderboardEngine<S> {
    source: S,
}

impl<S: RecordSource> LeaderboardEngine<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn leaderboard(
        &self,
        query: &LeaderboardQuery,
        today: NaiveDate,
    ) -> Result<LeaderboardResponse, LeaderboardError> {
        let records = self.source.list_records(&query.scope)?;
        let response = compute_leaderboard(records, query, today);
        log::debug!(
            "Leaderboard for {}: {} participants ranked by {}",
            query.scope.as_str(),
            response.total_participants,
            response.ranking_mode.as_str()
        );
        Ok(response)
    }

    pub fn medal_history(
        &self,
        scope: &LocationScope,
        runner_name: &str,
    ) -> Result<Vec<MedalAward>, LeaderboardError> {
        let records = self.source.list_records(scope)?;
        Ok(medals::medal_history(&records, runner_name))
    }

    pub fn available_years(&self, scope: &LocationScope) -> Result<Vec<i32>, LeaderboardError> {
        Ok(catalog::available_years(&self.source.list_records(scope)?))
    }

    pub fn event_dates(&self, scope: &LocationScope) -> Result<Vec<EventDate>, LeaderboardError> {
        Ok(catalog::event_dates(&self.source.list_records(scope)?))
    }

    pub fn age_group_keys(&self, scope: &LocationScope) -> Result<Vec<String>, LeaderboardError> {
        Ok(catalog::age_group_keys(&self.source.list_records(scope)?))
    }

    pub fn search_runners(&self, query: &str) -> Result<Vec<RunnerEntry>, LeaderboardError> {
        let records = self.source.list_records(&LocationScope::All)?;
        Ok(catalog::search_runners(&records, query))
    }
}
