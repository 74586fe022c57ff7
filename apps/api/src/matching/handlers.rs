//! Axum route handlers for the matching API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::geo::{rank_by_location, Coordinates};
use crate::matching::engine::MatchEngine;
use crate::models::matches::{LocatedMatch, MatchResult};
use crate::models::resume::{MatchRequest, ResumeQuery};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub success: bool,
    pub matches: Vec<MatchResult>,
    pub total_matches: usize,
}

#[derive(Debug, Serialize)]
pub struct LocationMatchResponse {
    pub success: bool,
    pub matches: Vec<LocatedMatch>,
    pub total_matches: usize,
    pub location_sorted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_coordinates: Option<Coordinates>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

fn parse_body(payload: Result<Json<MatchRequest>, JsonRejection>) -> Result<ResumeQuery, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let query = ResumeQuery::from(request);
    if query.is_blank() {
        info!("Empty resume submitted, returning a best-effort ranking");
    }
    Ok(query)
}

/// Runs the CPU-bound encode + scan on the blocking pool.
async fn rank_blocking(
    engine: MatchEngine,
    query: ResumeQuery,
    top_n: usize,
) -> Result<Vec<MatchResult>, AppError> {
    tokio::task::spawn_blocking(move || engine.rank(&query, top_n))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("matching task failed: {e}")))?
        .map_err(AppError::from)
}

/// POST /api/match-jobs
///
/// Ranks the catalog against the resume by weighted semantic similarity.
/// Missing fields are treated as empty; an empty resume still gets a ranking.
pub async fn handle_match_jobs(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchResponse>, AppError> {
    let query = parse_body(payload)?;
    let engine = state.engine()?;

    let matches = rank_blocking(engine, query, state.config.top_n_matches).await?;
    info!("Matched resume against catalog: {} results", matches.len());

    Ok(Json(MatchResponse {
        success: true,
        total_matches: matches.len(),
        matches,
    }))
}

/// POST /api/match-jobs-with-location
///
/// Takes the top semantic matches and re-sorts them by distance from the
/// resume location. Geocoding problems never fail the request: the response
/// falls back to score order with `location_sorted: false`.
pub async fn handle_match_jobs_with_location(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<LocationMatchResponse>, AppError> {
    let query = parse_body(payload)?;
    let engine = state.engine()?;
    let location = query.location.clone();

    let semantic = rank_blocking(engine.clone(), query, state.config.top_n_matches).await?;

    let ranking = rank_by_location(
        semantic,
        engine.catalog(),
        location.as_deref(),
        state.geocoder.as_ref(),
        &state.config.retry_policy(),
        state.config.top_n_location,
    )
    .await;

    Ok(Json(LocationMatchResponse {
        success: true,
        total_matches: ranking.matches.len(),
        matches: ranking.matches,
        location_sorted: ranking.location_sorted,
        warning: ranking.warning,
        resume_coordinates: ranking.resume_coordinates,
    }))
}
