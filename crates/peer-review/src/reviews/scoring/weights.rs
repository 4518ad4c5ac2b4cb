use serde::{Deserialize, Serialize};

use super::super::domain::Dimension;

/// Multiplier mapping a 1-5 rating onto the 0-100 scale (1 -> 20, 5 -> 100).
pub const RATING_SCALE: f64 = 20.0;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Per-dimension weights and the rating scale used by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    job_performance: f64,
    additional_achievements: f64,
    compliance: f64,
    teamwork: f64,
    diligence: f64,
    scale: f64,
}

impl WeightTable {
    /// Weights historical scores were computed with. Changing them breaks
    /// comparability with stored final scores.
    pub const STANDARD: Self = Self {
        job_performance: 0.50,
        additional_achievements: 0.20,
        compliance: 0.15,
        teamwork: 0.10,
        diligence: 0.05,
        scale: RATING_SCALE,
    };

    /// Build an alternate table, weights given in [`Dimension::ordered`] order.
    pub fn new(weights: [f64; 5], scale: f64) -> Result<Self, WeightTableError> {
        for (dimension, weight) in Dimension::ordered().into_iter().zip(weights) {
            if !weight.is_finite() || weight < 0.0 {
                return Err(WeightTableError::InvalidWeight { dimension, weight });
            }
        }

        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightTableError::UnbalancedWeights { total });
        }

        if !scale.is_finite() || scale <= 0.0 {
            return Err(WeightTableError::InvalidScale(scale));
        }

        let [job_performance, additional_achievements, compliance, teamwork, diligence] = weights;
        Ok(Self {
            job_performance,
            additional_achievements,
            compliance,
            teamwork,
            diligence,
            scale,
        })
    }

    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::JobPerformance => self.job_performance,
            Dimension::AdditionalAchievements => self.additional_achievements,
            Dimension::Compliance => self.compliance,
            Dimension::Teamwork => self.teamwork,
            Dimension::Diligence => self.diligence,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightTableError {
    #[error("weight for {dimension} must be a non-negative number (found {weight})")]
    InvalidWeight { dimension: Dimension, weight: f64 },
    #[error("weights must sum to 1.0 (found {total})")]
    UnbalancedWeights { total: f64 },
    #[error("rating scale must be positive (found {0})")]
    InvalidScale(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_weights_sum_to_one() {
        let total: f64 = Dimension::ordered()
            .into_iter()
            .map(|dimension| WeightTable::STANDARD.weight(dimension))
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(WeightTable::STANDARD.scale(), 20.0);
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        match WeightTable::new([0.5, 0.2, 0.2, 0.1, 0.1], RATING_SCALE) {
            Err(WeightTableError::UnbalancedWeights { total }) => {
                assert!((total - 1.1).abs() < 1e-9)
            }
            other => panic!("expected unbalanced weights, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_weight_naming_dimension() {
        match WeightTable::new([0.6, 0.2, 0.15, 0.1, -0.05], RATING_SCALE) {
            Err(WeightTableError::InvalidWeight { dimension, .. }) => {
                assert_eq!(dimension, Dimension::Diligence)
            }
            other => panic!("expected invalid weight, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(matches!(
            WeightTable::new([0.2; 5], 0.0),
            Err(WeightTableError::InvalidScale(_))
        ));
    }
}
