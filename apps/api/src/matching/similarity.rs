//! Similarity Scorer: cosine similarity between query and catalog embeddings.

use crate::matching::catalog::JobCatalog;
use crate::matching::encoder::Embedding;
use crate::models::matches::ScoreBreakdown;

/// Query-side embeddings, one per matching dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEmbeddings {
    pub position: Embedding,
    pub skills: Embedding,
    pub qualification: Embedding,
    pub experience: Embedding,
}

/// dot(a, b) / (‖a‖·‖b‖). Returns 0.0 when either vector has zero norm or
/// the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Scores every job in the catalog, in catalog order.
///
/// Experience is scored against the job's skills/description embedding, the
/// field that carries a posting's experience requirements.
pub fn score_catalog(query: &QueryEmbeddings, catalog: &JobCatalog) -> Vec<ScoreBreakdown> {
    catalog
        .jobs()
        .iter()
        .map(|job| ScoreBreakdown {
            pos_score: cosine_similarity(&query.position, &job.embeddings.position),
            skill_score: cosine_similarity(&query.skills, &job.embeddings.skills),
            qual_score: cosine_similarity(&query.qualification, &job.embeddings.qualification),
            exp_score: cosine_similarity(&query.experience, &job.embeddings.skills),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors_score_one() {
        let v = [0.3, -0.2, 0.9];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_vectors_score_minus_one() {
        let a = [1.0, 2.0];
        let b = [-1.0, -2.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_zero_norm_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_length_mismatch_scores_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let pairs: [(&[f32], &[f32]); 3] = [
            (&[0.1, 0.7, -0.4], &[0.5, -0.2, 0.3]),
            (&[3.0, 4.0], &[4.0, 3.0]),
            (&[0.0, 1.0, 0.0], &[0.2, 0.2, 0.9]),
        ];
        for (a, b) in pairs {
            assert_eq!(cosine_similarity(a, b), cosine_similarity(b, a));
        }
    }

    #[test]
    fn test_magnitude_does_not_matter() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0, 30.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }
}
