use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::geo::nominatim::DEFAULT_NOMINATIM_URL;
use crate::geo::RetryPolicy;
use crate::matching::encoder::EncoderBackend;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub catalog_path: PathBuf,
    pub encoder_backend: EncoderBackend,
    pub model_cache_dir: Option<PathBuf>,
    pub top_n_matches: usize,
    pub top_n_location: usize,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocode_max_attempts: u32,
    pub geocode_backoff: Duration,
    pub geocode_timeout: Duration,
    pub geocode_min_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            catalog_path: PathBuf::from("job_embeddings.json"),
            encoder_backend: EncoderBackend::FastEmbed,
            model_cache_dir: None,
            top_n_matches: 20,
            top_n_location: 10,
            geocoder_url: DEFAULT_NOMINATIM_URL.to_string(),
            geocoder_user_agent: "job_matcher_api".to_string(),
            geocode_max_attempts: 3,
            geocode_backoff: Duration::from_millis(1000),
            geocode_timeout: Duration::from_secs(10),
            geocode_min_interval: Duration::from_millis(1000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            catalog_path: std::env::var("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_path),
            encoder_backend: match std::env::var("ENCODER_BACKEND") {
                Ok(v) => v.parse::<EncoderBackend>().map_err(|e| anyhow!(e))?,
                Err(_) => defaults.encoder_backend,
            },
            model_cache_dir: std::env::var("MODEL_CACHE_DIR").ok().map(PathBuf::from),
            top_n_matches: parse_env("TOP_N_MATCHES", defaults.top_n_matches)?,
            top_n_location: parse_env("TOP_N_LOCATION", defaults.top_n_location)?,
            geocoder_url: std::env::var("GEOCODER_URL").unwrap_or(defaults.geocoder_url),
            geocoder_user_agent: std::env::var("GEOCODER_USER_AGENT")
                .unwrap_or(defaults.geocoder_user_agent),
            geocode_max_attempts: parse_env("GEOCODE_MAX_ATTEMPTS", defaults.geocode_max_attempts)?,
            geocode_backoff: Duration::from_millis(parse_env("GEOCODE_BACKOFF_MS", 1000u64)?),
            geocode_timeout: Duration::from_secs(parse_env("GEOCODE_TIMEOUT_SECS", 10u64)?),
            geocode_min_interval: Duration::from_millis(parse_env(
                "GEOCODE_MIN_INTERVAL_MS",
                1000u64,
            )?),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.geocode_max_attempts,
            base_delay: self.geocode_backoff,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
