use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for employees known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for stored reviews.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub String);

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The five rated performance categories, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    JobPerformance,
    AdditionalAchievements,
    Compliance,
    Teamwork,
    Diligence,
}

impl Dimension {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::JobPerformance,
            Self::AdditionalAchievements,
            Self::Compliance,
            Self::Teamwork,
            Self::Diligence,
        ]
    }

    /// Wire key used in request and response payloads.
    pub const fn key(self) -> &'static str {
        match self {
            Self::JobPerformance => "jobPerformance",
            Self::AdditionalAchievements => "additionalAchievements",
            Self::Compliance => "compliance",
            Self::Teamwork => "teamwork",
            Self::Diligence => "diligence",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::JobPerformance => "Job Performance",
            Self::AdditionalAchievements => "Additional Achievements",
            Self::Compliance => "Compliance",
            Self::Teamwork => "Teamwork",
            Self::Diligence => "Diligence",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw ratings as submitted; any dimension may be absent until validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSheet {
    #[serde(default)]
    pub job_performance: Option<f64>,
    #[serde(default)]
    pub additional_achievements: Option<f64>,
    #[serde(default)]
    pub compliance: Option<f64>,
    #[serde(default)]
    pub teamwork: Option<f64>,
    #[serde(default)]
    pub diligence: Option<f64>,
}

impl ScoreSheet {
    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::JobPerformance => self.job_performance,
            Dimension::AdditionalAchievements => self.additional_achievements,
            Dimension::Compliance => self.compliance,
            Dimension::Teamwork => self.teamwork,
            Dimension::Diligence => self.diligence,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: Option<f64>) {
        let slot = match dimension {
            Dimension::JobPerformance => &mut self.job_performance,
            Dimension::AdditionalAchievements => &mut self.additional_achievements,
            Dimension::Compliance => &mut self.compliance,
            Dimension::Teamwork => &mut self.teamwork,
            Dimension::Diligence => &mut self.diligence,
        };
        *slot = value;
    }
}

impl From<ReviewScores> for ScoreSheet {
    fn from(scores: ReviewScores) -> Self {
        Self {
            job_performance: Some(scores.job_performance),
            additional_achievements: Some(scores.additional_achievements),
            compliance: Some(scores.compliance),
            teamwork: Some(scores.teamwork),
            diligence: Some(scores.diligence),
        }
    }
}

/// Complete, range-checked ratings. Only produced by
/// [`validate_scores`](crate::reviews::validate_scores).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewScores {
    pub(crate) job_performance: f64,
    pub(crate) additional_achievements: f64,
    pub(crate) compliance: f64,
    pub(crate) teamwork: f64,
    pub(crate) diligence: f64,
}

impl ReviewScores {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::JobPerformance => self.job_performance,
            Dimension::AdditionalAchievements => self.additional_achievements,
            Dimension::Compliance => self.compliance,
            Dimension::Teamwork => self.teamwork,
            Dimension::Diligence => self.diligence,
        }
    }
}

/// A quarter of a calendar year that reviews are collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReviewPeriod {
    pub year: i32,
    pub quarter: u8,
}

impl ReviewPeriod {
    pub const fn new(quarter: u8, year: i32) -> Self {
        Self { year, quarter }
    }

    /// The quarter immediately before this one, crossing into the prior year from Q1.
    pub const fn previous(self) -> Self {
        if self.quarter <= 1 {
            Self::new(4, self.year - 1)
        } else {
            Self::new(self.quarter - 1, self.year)
        }
    }
}

impl fmt::Display for ReviewPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

/// Lifecycle of a review; drafts may be saved at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Draft,
    Submitted,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewStatus::Draft => "draft",
            ReviewStatus::Submitted => "submitted",
        }
    }
}

/// Caller payload for creating or updating a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub reviewee: EmployeeId,
    pub quarter: u8,
    pub year: i32,
    pub scores: ScoreSheet,
    #[serde(default)]
    pub status: Option<ReviewStatus>,
}

/// Access level granted to an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

/// Directory entry for someone who can review or be reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub employee_code: String,
    pub department: String,
    pub role: Role,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl Employee {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Payload for registering a new employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub employee_code: String,
    pub department: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Partial update applied to an existing employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub active: Option<bool>,
}
