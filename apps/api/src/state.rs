use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::geo::Geocoder;
use crate::matching::catalog::JobCatalog;
use crate::matching::combiner::ScoringWeights;
use crate::matching::encoder::TextEncoder;
use crate::matching::engine::MatchEngine;

/// Shared application state injected into all route handlers via Axum extractors.
/// Encoder and catalog are loaded once at startup and never mutated; `None`
/// means loading failed and the matching routes answer 503.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub encoder: Option<Arc<dyn TextEncoder>>,
    pub catalog: Option<Arc<JobCatalog>>,
    pub weights: ScoringWeights,
    /// Pluggable geocoder. Default: NominatimGeocoder.
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    pub fn model_ready(&self) -> bool {
        self.encoder.is_some()
    }

    pub fn jobs_loaded(&self) -> usize {
        self.catalog.as_ref().map_or(0, |c| c.len())
    }

    /// A handle on the matching pipeline, or the reason matching is impossible.
    pub fn engine(&self) -> Result<MatchEngine, AppError> {
        let catalog = self.catalog.clone().ok_or_else(|| {
            AppError::CatalogUnavailable(
                "the job catalog artifact could not be loaded; regenerate it with build-catalog"
                    .to_string(),
            )
        })?;
        let encoder = self.encoder.clone().ok_or_else(|| {
            AppError::EncoderUnavailable("the embedding model failed to load".to_string())
        })?;
        Ok(MatchEngine::new(encoder, catalog, self.weights))
    }
}
