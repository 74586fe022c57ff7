//! Score Combiner: fixed weighted sum of the per-dimension similarities.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::matches::ScoreBreakdown;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("scoring weights must sum to 1.0, got {0}")]
    BadSum(f64),

    #[error("scoring weight '{0}' is negative")]
    Negative(&'static str),
}

/// Weights per matching dimension. An empty query field scores 0 on its
/// dimension and stays in the sum; weights are never renormalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub position: f64,
    pub skills: f64,
    pub qualification: f64,
    pub experience: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            position: 0.45,
            skills: 0.25,
            qualification: 0.20,
            experience: 0.10,
        }
    }
}

impl ScoringWeights {
    /// Checked once at startup.
    pub fn validate(&self) -> Result<(), WeightsError> {
        for (name, w) in [
            ("position", self.position),
            ("skills", self.skills),
            ("qualification", self.qualification),
            ("experience", self.experience),
        ] {
            if w < 0.0 {
                return Err(WeightsError::Negative(name));
            }
        }

        let sum = self.position + self.skills + self.qualification + self.experience;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::BadSum(sum));
        }
        Ok(())
    }
}

/// Unclipped weighted sum of the breakdown. This is the ranking key.
pub fn weighted_sum(breakdown: &ScoreBreakdown, weights: &ScoringWeights) -> f64 {
    weights.position * f64::from(breakdown.pos_score)
        + weights.skills * f64::from(breakdown.skill_score)
        + weights.qualification * f64::from(breakdown.qual_score)
        + weights.experience * f64::from(breakdown.exp_score)
}

/// Weighted sum of the breakdown, clipped to [0, 1] for display.
pub fn combine(breakdown: &ScoreBreakdown, weights: &ScoringWeights) -> f32 {
    weighted_sum(breakdown, weights).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown(pos: f32, skill: f32, qual: f32, exp: f32) -> ScoreBreakdown {
        ScoreBreakdown {
            pos_score: pos,
            skill_score: skill,
            qual_score: qual,
            exp_score: exp,
        }
    }

    #[test]
    fn test_default_weights_are_valid() {
        assert_eq!(ScoringWeights::default().validate(), Ok(()));
    }

    #[test]
    fn test_weights_not_summing_to_one_rejected() {
        let w = ScoringWeights {
            position: 0.5,
            ..ScoringWeights::default()
        };
        assert!(matches!(w.validate(), Err(WeightsError::BadSum(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = ScoringWeights {
            position: 0.65,
            experience: -0.10,
            ..ScoringWeights::default()
        };
        assert_eq!(w.validate(), Err(WeightsError::Negative("experience")));
    }

    #[test]
    fn test_combine_full_scores() {
        let score = combine(&breakdown(1.0, 1.0, 1.0, 1.0), &ScoringWeights::default());
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_combine_partial() {
        // 0.45*0.8 + 0.25*0.6 + 0.20*0.4 + 0.10*0.2 = 0.36 + 0.15 + 0.08 + 0.02 = 0.61
        let score = combine(&breakdown(0.8, 0.6, 0.4, 0.2), &ScoringWeights::default());
        assert!((score - 0.61).abs() < 1e-5, "score was {score}");
    }

    #[test]
    fn test_missing_dimension_keeps_its_weight() {
        // Empty experience text scores 0 and is not renormalized away.
        let score = combine(&breakdown(1.0, 1.0, 1.0, 0.0), &ScoringWeights::default());
        assert!((score - 0.9).abs() < 1e-5, "score was {score}");
    }

    #[test]
    fn test_negative_similarity_clipped_to_zero() {
        let score = combine(&breakdown(-0.4, -0.2, 0.1, 0.0), &ScoringWeights::default());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_weighted_sum_keeps_negative_values() {
        let w = ScoringWeights::default();
        let opposite = weighted_sum(&breakdown(-1.0, 0.0, 0.0, 0.0), &w);
        let slightly = weighted_sum(&breakdown(-0.1, 0.0, 0.0, 0.0), &w);
        assert!((opposite + 0.45).abs() < 1e-6, "sum was {opposite}");
        assert!(slightly > opposite);
    }

    #[test]
    fn test_combine_is_deterministic() {
        let b = breakdown(0.42, 0.17, 0.93, 0.05);
        let w = ScoringWeights::default();
        let first = combine(&b, &w);
        for _ in 0..100 {
            assert_eq!(combine(&b, &w), first);
        }
    }
}
