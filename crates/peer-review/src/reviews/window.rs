//! Quarterly submission windows.
//!
//! Each quarter accepts submissions from the 25th of its last month through the
//! 14th of the following month. Every function here takes "now" explicitly;
//! only the service reads a clock.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::domain::ReviewPeriod;

const OPENS_ON_DAY: u32 = 25;
const CLOSES_ON_DAY: u32 = 14;

/// Inclusive date range in which a period accepts submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmissionWindow {
    pub period: ReviewPeriod,
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
}

impl SubmissionWindow {
    /// Window for `period`, or `None` when the quarter is not 1-4.
    pub fn for_period(period: ReviewPeriod) -> Option<Self> {
        if !(1..=4).contains(&period.quarter) {
            return None;
        }

        let closing_month = u32::from(period.quarter) * 3;
        let opens_on = NaiveDate::from_ymd_opt(period.year, closing_month, OPENS_ON_DAY)?;
        let closes_on = if closing_month == 12 {
            NaiveDate::from_ymd_opt(period.year + 1, 1, CLOSES_ON_DAY)?
        } else {
            NaiveDate::from_ymd_opt(period.year, closing_month + 1, CLOSES_ON_DAY)?
        };

        Some(Self {
            period,
            opens_on,
            closes_on,
        })
    }

    pub fn opens_at(&self) -> NaiveDateTime {
        self.opens_on.and_time(NaiveTime::MIN)
    }

    /// Midnight at the start of the closing day; nothing later on that day is accepted.
    pub fn closes_at(&self) -> NaiveDateTime {
        self.closes_on.and_time(NaiveTime::MIN)
    }

    /// Closed interval from `opens_at` through `closes_at`.
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        self.opens_at() <= now && now <= self.closes_at()
    }

    pub fn crosses_year(&self) -> bool {
        self.opens_on.year() != self.closes_on.year()
    }
}

/// How the period year is compared against the calendar year of "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YearBoundary {
    /// The period year must match the year the window opens in; Q4 stays open
    /// into January of the following year.
    #[default]
    WindowAnchored,
    /// The period year must equal the calendar year of "now", which closes Q4
    /// on December 31.
    StrictCalendarYear,
}

/// Decides whether a period currently accepts submitted reviews.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionWindowPolicy {
    year_boundary: YearBoundary,
}

impl SubmissionWindowPolicy {
    pub fn new(year_boundary: YearBoundary) -> Self {
        Self { year_boundary }
    }

    pub fn year_boundary(&self) -> YearBoundary {
        self.year_boundary
    }

    pub fn is_open(&self, period: ReviewPeriod, now: NaiveDateTime) -> bool {
        let Some(window) = SubmissionWindow::for_period(period) else {
            return false;
        };

        let anchor_year = match self.year_boundary {
            YearBoundary::WindowAnchored => window.opens_on.year(),
            YearBoundary::StrictCalendarYear => now.year(),
        };
        if period.year != anchor_year {
            return false;
        }

        window.contains(now)
    }

    pub fn check(&self, period: ReviewPeriod, now: NaiveDateTime) -> Result<(), PolicyViolation> {
        if self.is_open(period, now) {
            return Ok(());
        }

        match SubmissionWindow::for_period(period) {
            Some(window) => Err(PolicyViolation::SubmissionClosed {
                period,
                opens_on: window.opens_on,
                closes_on: window.closes_on,
            }),
            None => Err(PolicyViolation::NoWindow(period)),
        }
    }

    pub fn status(&self, period: ReviewPeriod, now: NaiveDateTime) -> Option<WindowStatus> {
        SubmissionWindow::for_period(period).map(|window| WindowStatus {
            period,
            opens_on: window.opens_on,
            closes_on: window.closes_on,
            open: self.is_open(period, now),
        })
    }
}

/// Window dates paired with whether they are open at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowStatus {
    pub period: ReviewPeriod,
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
    pub open: bool,
}

/// Rejection raised when a submission falls outside its window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("submissions for {period} are only accepted from {opens_on} through {closes_on}")]
    SubmissionClosed {
        period: ReviewPeriod,
        opens_on: NaiveDate,
        closes_on: NaiveDate,
    },
    #[error("{0} has no submission window")]
    NoWindow(ReviewPeriod),
}

/// Window-anchored policy check for a raw quarter and year.
pub fn is_submission_open(quarter: u8, year: i32, now: NaiveDateTime) -> bool {
    SubmissionWindowPolicy::default().is_open(ReviewPeriod::new(quarter, year), now)
}

/// Period shown by default: the calendar quarter, except during the first 14
/// days of a quarter when the previous quarter's window is still running.
pub fn current_period(now: NaiveDateTime) -> ReviewPeriod {
    let month = now.month();
    let quarter = ((month - 1) / 3 + 1) as u8;
    let period = ReviewPeriod::new(quarter, now.year());

    if month % 3 == 1 && now.day() <= CLOSES_ON_DAY {
        period.previous()
    } else {
        period
    }
}
