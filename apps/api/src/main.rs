use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use job_matcher::config::Config;
use job_matcher::geo::NominatimGeocoder;
use job_matcher::matching::catalog::JobCatalog;
use job_matcher::matching::combiner::ScoringWeights;
use job_matcher::matching::encoder::TextEncoder;
use job_matcher::routes::build_router;
use job_matcher::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job matcher API v{}", env!("CARGO_PKG_VERSION"));

    // Weights define ranking semantics; refuse to start with a bad policy
    let weights = ScoringWeights::default();
    weights.validate()?;
    info!("Scoring weights: {:?}", weights);

    // Load the embedding model (slow: download + ONNX session)
    let backend = config.encoder_backend;
    let cache_dir = config.model_cache_dir.clone();
    let encoder: Option<Arc<dyn TextEncoder>> =
        match tokio::task::spawn_blocking(move || backend.load(cache_dir.as_deref())).await? {
            Ok(encoder) => {
                info!("Encoder ready: {}", encoder.identity());
                Some(encoder)
            }
            Err(e) => {
                error!("Encoder unavailable, matching is disabled: {e}");
                None
            }
        };

    // Load the precomputed job catalog; it must match the configured encoder
    let identity = config.encoder_backend.identity();
    let catalog = match JobCatalog::load(&config.catalog_path, &identity) {
        Ok(catalog) => Some(Arc::new(catalog)),
        Err(e) => {
            error!("Job catalog unavailable, matching is disabled: {e}");
            None
        }
    };

    let geocoder = Arc::new(NominatimGeocoder::new(
        &config.geocoder_url,
        &config.geocoder_user_agent,
        config.geocode_timeout,
        config.geocode_min_interval,
    )?);
    info!("Geocoder initialized ({})", config.geocoder_url);

    // Build app state
    let state = AppState {
        config: config.clone(),
        encoder,
        catalog,
        weights,
        geocoder,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
