use serde::Serialize;

use crate::geo::Coordinates;
use crate::models::job::JobDetails;

/// Raw cosine similarity per matching dimension. Values may be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub pos_score: f32,
    pub skill_score: f32,
    pub qual_score: f32,
    pub exp_score: f32,
}

/// One scored job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Weighted combination of the breakdown, clipped to [0, 1].
    pub match_score: f32,
    pub breakdown: ScoreBreakdown,
    pub job_details: JobDetails,
    /// Unclipped weighted sum; results are ordered by this.
    #[serde(skip)]
    pub raw_score: f64,
    /// Position of the job in the catalog.
    #[serde(skip)]
    pub catalog_index: usize,
}

/// A match annotated by the location-aware path.
/// The location fields stay `null` when the ranking was not location sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedMatch {
    #[serde(flatten)]
    pub result: MatchResult,
    pub distance_km: Option<f64>,
    pub location_rank: Option<usize>,
    pub job_coordinates: Option<Coordinates>,
}

impl From<MatchResult> for LocatedMatch {
    fn from(result: MatchResult) -> Self {
        Self {
            result,
            distance_km: None,
            location_rank: None,
            job_coordinates: None,
        }
    }
}
