pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::health_handler))
        .route("/api/match-jobs", post(handlers::handle_match_jobs))
        .route(
            "/api/match-jobs-with-location",
            post(handlers::handle_match_jobs_with_location),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::geo::testing::StubGeocoder;
    use crate::geo::Geocoder;
    use crate::matching::combiner::ScoringWeights;
    use crate::matching::engine::testing::{catalog_for, details, hashing_encoder, sample_jobs};

    fn test_config() -> Config {
        Config {
            geocode_backoff: std::time::Duration::from_millis(1),
            ..Config::default()
        }
    }

    fn ready_state(geocoder: Arc<dyn Geocoder>) -> AppState {
        let encoder = hashing_encoder();
        let catalog = catalog_for(encoder.as_ref(), sample_jobs());
        AppState {
            config: test_config(),
            encoder: Some(encoder),
            catalog: Some(catalog),
            weights: ScoringWeights::default(),
            geocoder,
        }
    }

    fn unloaded_state() -> AppState {
        AppState {
            config: test_config(),
            encoder: Some(hashing_encoder()),
            catalog: None,
            weights: ScoringWeights::default(),
            geocoder: Arc::new(StubGeocoder::new()),
        }
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn titles(body: &Value) -> Vec<String> {
        body["matches"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["job_details"]["job_title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_health_reports_loaded_state() {
        let state = ready_state(Arc::new(StubGeocoder::new()));
        let (status, body) = send(
            state,
            Request::get("/api/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["jobs_loaded"], 3);
        assert_eq!(body["model_ready"], true);
    }

    #[tokio::test]
    async fn test_health_reports_zero_jobs_without_catalog() {
        let (status, body) = send(
            unloaded_state(),
            Request::get("/api/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["jobs_loaded"], 0);
    }

    #[tokio::test]
    async fn test_match_jobs_ranks_ml_job_above_designer() {
        let state = ready_state(Arc::new(StubGeocoder::new()));
        let (status, body) = send(
            state,
            post_json(
                "/api/match-jobs",
                json!({
                    "position": "Software Engineer",
                    "skills": "Python, Machine Learning",
                    "qualification": "Bachelor in CS",
                    "experience": "3 years"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let titles = titles(&body);
        let ml = titles.iter().position(|t| t == "Senior ML Engineer").unwrap();
        let designer = titles.iter().position(|t| t == "Graphic Designer").unwrap();
        assert!(ml < designer, "{titles:?}");

        let first = &body["matches"][0];
        assert!(first["breakdown"]["pos_score"].is_number());
        assert!(first["job_details"].get("embeddings").is_none());
    }

    #[tokio::test]
    async fn test_empty_resume_gets_full_ranking() {
        let state = ready_state(Arc::new(StubGeocoder::new()));
        let (status, body) = send(
            state,
            post_json(
                "/api/match-jobs",
                json!({"position": "", "skills": "", "qualification": "", "experience": ""}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["total_matches"], 3);
    }

    #[tokio::test]
    async fn test_top_n_comes_from_config() {
        let mut state = ready_state(Arc::new(StubGeocoder::new()));
        state.config.top_n_matches = 2;
        let (_, body) = send(state, post_json("/api/match-jobs", json!({}))).await;
        assert_eq!(body["total_matches"], 2);
        assert_eq!(body["matches"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_matching_without_catalog_fails_cleanly() {
        let (status, body) = send(
            unloaded_state(),
            post_json("/api/match-jobs", json!({"position": "Nurse"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("catalog"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_validation_error() {
        let request = Request::post("/api/match-jobs")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ definitely not json"))
            .unwrap();
        let (status, body) = send(ready_state(Arc::new(StubGeocoder::new())), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_location_route_sorts_by_distance() {
        let encoder = hashing_encoder();
        let jobs = vec![
            details("Backend Engineer", "Rust", "APIs", "BSc"),
            details("Backend Engineer", "Rust", "APIs", "BSc"),
            details("Backend Engineer", "Rust", "APIs", "BSc"),
        ]
        .into_iter()
        .zip(["Far City", "Near Town", "Mid Ville"])
        .map(|(mut job, location)| {
            job.company = location.to_string();
            job.location = location.to_string();
            job
        })
        .collect();
        let catalog = catalog_for(encoder.as_ref(), jobs);
        let geocoder = StubGeocoder::new()
            .with_place("Home", 0.0, 0.0)
            .with_place("Near Town", 0.045, 0.0)
            .with_place("Mid Ville", 0.45, 0.0)
            .with_place("Far City", 4.5, 0.0);
        let state = AppState {
            config: test_config(),
            encoder: Some(encoder),
            catalog: Some(catalog),
            weights: ScoringWeights::default(),
            geocoder: Arc::new(geocoder),
        };

        let (status, body) = send(
            state,
            post_json(
                "/api/match-jobs-with-location",
                json!({"position": "Backend Engineer", "skills": "Rust", "location": "Home"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location_sorted"], true);
        let companies: Vec<&str> = body["matches"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["job_details"]["company"].as_str().unwrap())
            .collect();
        assert_eq!(companies, vec!["Near Town", "Mid Ville", "Far City"]);
        assert_eq!(body["matches"][0]["location_rank"], 1);
        assert!(body["matches"][0]["distance_km"].as_f64().unwrap() < 10.0);
        assert!(body["matches"][0]["match_score"].is_number());
    }

    #[tokio::test]
    async fn test_location_route_degrades_on_unresolvable_location() {
        let state = ready_state(Arc::new(StubGeocoder::new()));
        let (status, body) = send(
            state,
            post_json(
                "/api/match-jobs-with-location",
                json!({
                    "position": "Software Engineer",
                    "skills": "Python, Machine Learning",
                    "location": "Qwxz Unmapped Place"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["location_sorted"], false);
        assert!(body["warning"].is_string());
        let matches = body["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 3);
        let scores: Vec<f64> = matches
            .iter()
            .map(|m| m["match_score"].as_f64().unwrap())
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
        assert!(matches[0]["distance_km"].is_null());
    }
}
