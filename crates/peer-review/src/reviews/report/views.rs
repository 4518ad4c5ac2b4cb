use serde::Serialize;

use super::super::domain::{EmployeeId, ReviewPeriod};

/// Averages per dimension across every submitted review of one reviewee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionAverages {
    pub job_performance: f64,
    pub additional_achievements: f64,
    pub compliance: f64,
    pub teamwork: f64,
    pub diligence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub employee_code: String,
    pub department: String,
    pub review_count: usize,
    pub average_score: f64,
    pub dimension_averages: DimensionAverages,
}

/// Per-reviewee results for a period, best average first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: ReviewPeriod,
    pub department: String,
    pub count: usize,
    pub entries: Vec<SummaryEntry>,
}
