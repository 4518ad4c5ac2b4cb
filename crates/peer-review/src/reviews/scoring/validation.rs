use super::super::domain::{Dimension, EmployeeId, ReviewPeriod, ReviewScores, ScoreSheet};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;
pub const FIRST_REVIEW_YEAR: i32 = 2020;

/// Input problems the caller can fix and resubmit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("reviewers cannot review themselves")]
    SelfReview,
    #[error("score for {0} is missing")]
    MissingDimension(Dimension),
    #[error("score for {dimension} must be between 1 and 5 (found {value})")]
    OutOfRange { dimension: Dimension, value: f64 },
    #[error("quarter must be between 1 and 4 (found {0})")]
    InvalidQuarter(u8),
    #[error("year must be 2020 or later (found {0})")]
    InvalidYear(i32),
}

impl ValidationError {
    /// Dimension at fault, when the error concerns a single rating.
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            ValidationError::MissingDimension(dimension)
            | ValidationError::OutOfRange { dimension, .. } => Some(*dimension),
            _ => None,
        }
    }
}

/// Check every dimension in canonical order and return the first violation.
pub fn validate_scores(sheet: &ScoreSheet) -> Result<ReviewScores, ValidationError> {
    let mut values = [0.0; 5];
    for (slot, dimension) in values.iter_mut().zip(Dimension::ordered()) {
        let value = sheet
            .get(dimension)
            .ok_or(ValidationError::MissingDimension(dimension))?;
        if !value.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(ValidationError::OutOfRange { dimension, value });
        }
        *slot = value;
    }

    let [job_performance, additional_achievements, compliance, teamwork, diligence] = values;
    Ok(ReviewScores {
        job_performance,
        additional_achievements,
        compliance,
        teamwork,
        diligence,
    })
}

pub fn validate_participants(
    reviewer: &EmployeeId,
    reviewee: &EmployeeId,
) -> Result<(), ValidationError> {
    if reviewer == reviewee {
        return Err(ValidationError::SelfReview);
    }
    Ok(())
}

pub fn validate_period(quarter: u8, year: i32) -> Result<ReviewPeriod, ValidationError> {
    if !(1..=4).contains(&quarter) {
        return Err(ValidationError::InvalidQuarter(quarter));
    }
    if year < FIRST_REVIEW_YEAR {
        return Err(ValidationError::InvalidYear(year));
    }
    Ok(ReviewPeriod::new(quarter, year))
}

/// Full pre-persistence check: participants first, then the period, then ratings.
pub fn validate_review(
    reviewer: &EmployeeId,
    reviewee: &EmployeeId,
    quarter: u8,
    year: i32,
    sheet: &ScoreSheet,
) -> Result<(ReviewPeriod, ReviewScores), ValidationError> {
    validate_participants(reviewer, reviewee)?;
    let period = validate_period(quarter, year)?;
    let scores = validate_scores(sheet)?;
    Ok((period, scores))
}
