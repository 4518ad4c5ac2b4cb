use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::domain::{EmployeeId, ReviewId, ReviewPeriod, ReviewScores, ReviewStatus};
use super::scoring::{FinalScore, ScoringEngine};

/// Uniqueness key: one review per reviewer, reviewee, and period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReviewKey {
    pub reviewer: EmployeeId,
    pub reviewee: EmployeeId,
    pub period: ReviewPeriod,
}

/// Stored review with its derived final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    pub id: ReviewId,
    pub reviewer: EmployeeId,
    pub reviewee: EmployeeId,
    pub period: ReviewPeriod,
    pub scores: ReviewScores,
    pub final_score: FinalScore,
    pub status: ReviewStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub submitted_at: Option<NaiveDateTime>,
}

impl ReviewRecord {
    pub fn new(
        id: ReviewId,
        key: ReviewKey,
        scores: ReviewScores,
        status: ReviewStatus,
        engine: &ScoringEngine,
        now: NaiveDateTime,
    ) -> Self {
        let mut record = Self {
            id,
            reviewer: key.reviewer,
            reviewee: key.reviewee,
            period: key.period,
            final_score: engine.compute_final_score(&scores),
            scores,
            status,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        };
        record.prepare_save(engine, now);
        record
    }

    pub fn key(&self) -> ReviewKey {
        ReviewKey {
            reviewer: self.reviewer.clone(),
            reviewee: self.reviewee.clone(),
            period: self.period,
        }
    }

    /// Replace ratings and status ahead of a save.
    pub fn revise(
        &mut self,
        scores: ReviewScores,
        status: ReviewStatus,
        engine: &ScoringEngine,
        now: NaiveDateTime,
    ) {
        self.scores = scores;
        self.status = status;
        self.prepare_save(engine, now);
    }

    /// Runs on every save: refresh the derived score and stamp the first
    /// submission. A review moved back to draft loses its stamp.
    pub fn prepare_save(&mut self, engine: &ScoringEngine, now: NaiveDateTime) {
        self.final_score = engine.compute_final_score(&self.scores);
        self.updated_at = now;
        match self.status {
            ReviewStatus::Submitted if self.submitted_at.is_none() => self.submitted_at = Some(now),
            ReviewStatus::Submitted => {}
            ReviewStatus::Draft => self.submitted_at = None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.status == ReviewStatus::Submitted
    }

    pub fn involves(&self, employee: &EmployeeId) -> bool {
        &self.reviewer == employee || &self.reviewee == employee
    }
}

/// Filters for the administrative review listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewQuery {
    #[serde(default)]
    pub quarter: Option<u8>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub status: Option<ReviewStatus>,
    #[serde(default)]
    pub department: Option<String>,
}

impl ReviewQuery {
    /// Matches the record-level filters; department is resolved by the caller.
    pub fn matches(&self, record: &ReviewRecord) -> bool {
        self.quarter.map_or(true, |quarter| record.period.quarter == quarter)
            && self.year.map_or(true, |year| record.period.year == year)
            && self.status.map_or(true, |status| record.status == status)
    }
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait ReviewRepository: Send + Sync {
    /// Insert, or replace the record stored under the same key. A replaced
    /// record keeps its original id and creation time, and a submitted
    /// replacement keeps the earlier submission stamp.
    fn upsert(&self, record: ReviewRecord) -> Result<ReviewRecord, RepositoryError>;
    fn fetch(&self, id: &ReviewId) -> Result<Option<ReviewRecord>, RepositoryError>;
    fn find_by_key(&self, key: &ReviewKey) -> Result<Option<ReviewRecord>, RepositoryError>;
    fn by_reviewer(&self, reviewer: &EmployeeId) -> Result<Vec<ReviewRecord>, RepositoryError>;
    fn matching(&self, query: &ReviewQuery) -> Result<Vec<ReviewRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sort newest period first, most recent submission first within a period.
pub fn sort_newest_first(records: &mut [ReviewRecord]) {
    records.sort_by(|a, b| {
        b.period
            .cmp(&a.period)
            .then_with(|| b.submitted_at.cmp(&a.submitted_at))
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
}
