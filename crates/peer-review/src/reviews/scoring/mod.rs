mod validation;
mod weights;

pub use validation::{
    validate_participants, validate_period, validate_review, validate_scores, ValidationError,
    FIRST_REVIEW_YEAR, MAX_RATING, MIN_RATING,
};
pub use weights::{WeightTable, WeightTableError, RATING_SCALE};

use super::domain::{Dimension, ReviewScores, ScoreSheet};
use serde::Serialize;
use std::fmt;

/// Weighted score on the 0-100 scale, rounded to hundredths.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct FinalScore(f64);

impl FinalScore {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for FinalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Round half away from zero to two decimal places.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Stateless scorer applying a weight table to validated ratings.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: WeightTable,
}

impl ScoringEngine {
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    pub fn standard() -> Self {
        Self::new(WeightTable::STANDARD)
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn compute_final_score(&self, scores: &ReviewScores) -> FinalScore {
        let total: f64 = Dimension::ordered()
            .into_iter()
            .map(|dimension| self.contribution(scores, dimension))
            .sum();

        FinalScore(round_to_hundredths(total).clamp(0.0, 100.0))
    }

    /// Validate a raw sheet and score it in one step.
    pub fn score(&self, sheet: &ScoreSheet) -> Result<(ReviewScores, FinalScore), ValidationError> {
        let scores = validate_scores(sheet)?;
        let final_score = self.compute_final_score(&scores);
        Ok((scores, final_score))
    }

    /// Unrounded share of the final score contributed by one dimension.
    pub fn contribution(&self, scores: &ReviewScores, dimension: Dimension) -> f64 {
        scores.get(dimension) * self.weights.scale() * self.weights.weight(dimension)
    }
}
