//! Geocoder backed by the OpenStreetMap Nominatim search API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::{Coordinates, GeocodeOutcome, Geocoder, RequestPacer};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("failed to build geocoder HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Clones share one pacer, so the request spacing holds across all of them.
#[derive(Clone)]
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
    pacer: Arc<RequestPacer>,
}

impl NominatimGeocoder {
    /// Nominatim's usage policy requires an identifying User-Agent and at
    /// most one request per second; `min_interval` spaces out every request.
    pub fn new(
        endpoint: &str,
        user_agent: &str,
        timeout: Duration,
        min_interval: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            pacer: Arc::new(RequestPacer::new(min_interval)),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, location: &str) -> GeocodeOutcome {
        self.pacer.wait().await;
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", location), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return GeocodeOutcome::Transient(e.to_string()),
        };

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return GeocodeOutcome::Transient(format!("geocoder returned {status}"));
        }
        if !status.is_success() {
            warn!("Geocoder rejected '{location}' with {status}");
            return GeocodeOutcome::Unresolved;
        }

        let places: Vec<NominatimPlace> = match response.json().await {
            Ok(p) => p,
            Err(e) => return GeocodeOutcome::Transient(format!("unreadable geocoder response: {e}")),
        };

        places
            .first()
            .and_then(parse_place)
            .map_or(GeocodeOutcome::Unresolved, GeocodeOutcome::Resolved)
    }
}

/// Nominatim encodes coordinates as decimal strings.
fn parse_place(place: &NominatimPlace) -> Option<Coordinates> {
    let latitude = place.lat.trim().parse::<f64>().ok()?;
    let longitude = place.lon.trim().parse::<f64>().ok()?;
    let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
    valid.then(|| Coordinates::new(latitude, longitude))
}
