use std::sync::Arc;

use crate::matching::catalog::JobCatalog;
use crate::matching::combiner::{combine, weighted_sum, ScoringWeights};
use crate::matching::encoder::{EncoderError, TextEncoder};
use crate::matching::ranking::{select_top_n, RankOrder};
use crate::matching::similarity::{score_catalog, QueryEmbeddings};
use crate::matching::text;
use crate::models::matches::MatchResult;
use crate::models::resume::ResumeQuery;

/// The matching pipeline over a loaded encoder and catalog.
/// Cheap to clone; both halves are shared read-only.
#[derive(Clone)]
pub struct MatchEngine {
    encoder: Arc<dyn TextEncoder>,
    catalog: Arc<JobCatalog>,
    weights: ScoringWeights,
}

impl MatchEngine {
    pub fn new(
        encoder: Arc<dyn TextEncoder>,
        catalog: Arc<JobCatalog>,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            encoder,
            catalog,
            weights,
        }
    }

    pub fn catalog(&self) -> &JobCatalog {
        &self.catalog
    }

    /// One batched encode call for the four query dimensions.
    pub fn encode_query(&self, query: &ResumeQuery) -> Result<QueryEmbeddings, EncoderError> {
        let texts = [
            text::position_text(&query.position),
            text::query_skills_text(query),
            text::qualification_text(&query.qualification),
            text::query_experience_text(query),
        ];
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let mut vectors = self.encoder.encode_batch(&refs)?.into_iter();
        let mut next = || {
            vectors.next().ok_or(EncoderError::Count {
                expected: texts.len(),
                found: 0,
            })
        };

        Ok(QueryEmbeddings {
            position: next()?,
            skills: next()?,
            qualification: next()?,
            experience: next()?,
        })
    }

    /// Scores every catalog job, in catalog order.
    pub fn score_all(&self, query: &QueryEmbeddings) -> Vec<MatchResult> {
        score_catalog(query, &self.catalog)
            .into_iter()
            .zip(self.catalog.jobs())
            .enumerate()
            .map(|(catalog_index, (breakdown, job))| MatchResult {
                match_score: combine(&breakdown, &self.weights),
                raw_score: weighted_sum(&breakdown, &self.weights),
                breakdown,
                job_details: job.details.clone(),
                catalog_index,
            })
            .collect()
    }

    /// Encode, scan, combine, then keep the `top_n` best by score.
    /// CPU-bound; async callers should run it on a blocking thread.
    pub fn rank(&self, query: &ResumeQuery, top_n: usize) -> Result<Vec<MatchResult>, EncoderError> {
        let embeddings = self.encode_query(query)?;
        Ok(select_top_n(
            self.score_all(&embeddings),
            top_n,
            RankOrder::ByScore,
        ))
    }
}
