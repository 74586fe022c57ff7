//! Geo Ranker: geocoding and distance-based re-ranking of matches.
//!
//! Geocoding is an unreliable network collaborator. Every lookup returns a
//! `GeocodeOutcome`; transient outcomes are retried with exponential backoff
//! and anything still unresolved degrades the request to score ordering.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

pub mod nominatim;
pub mod ranker;

pub use nominatim::NominatimGeocoder;
pub use ranker::{rank_by_location, LocationRanking};

/// Mean Earth radius (IUGG).
const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Great-circle distance in kilometres (haversine formula).
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Result of a single geocoding attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Resolved(Coordinates),
    /// The service answered but knows no such place. Not retried.
    Unresolved,
    /// Rate limit, timeout or server error. Worth retrying.
    Transient(String),
}

/// A geocoding backend. One call is one attempt; retries live in
/// `resolve_with_retry`.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, location: &str) -> GeocodeOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Delay after failed attempt `attempt` (1-based): base × 2^(attempt-1).
/// Saturates instead of overflowing.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(1u32 << (attempt - 1).min(16))
        .unwrap_or(Duration::MAX)
}

/// Enforces a minimum spacing between outgoing requests.
/// Callers queue on the lock, so concurrent lookups are serialized too.
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    /// Waits until `min_interval` has passed since the previous call returned.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(deadline) = (*last).and_then(|previous| previous.checked_add(self.min_interval)) {
            tokio::time::sleep_until(deadline).await;
        }
        *last = Some(Instant::now());
    }
}

/// Geocodes `location`, retrying transient failures with exponential backoff
/// (base, 2×base, 4×base, ...). Returns `None` when the place is unknown or
/// every attempt failed.
pub async fn resolve_with_retry(
    geocoder: &dyn Geocoder,
    location: &str,
    policy: &RetryPolicy,
) -> Option<Coordinates> {
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        let reason = match geocoder.geocode(location).await {
            GeocodeOutcome::Resolved(coords) => return Some(coords),
            GeocodeOutcome::Unresolved => {
                debug!("Geocoder has no result for '{location}'");
                return None;
            }
            GeocodeOutcome::Transient(reason) => reason,
        };

        if attempt < attempts {
            let delay = backoff_delay(policy.base_delay, attempt);
            warn!(
                "Geocode attempt {} for '{}' failed ({}), retrying after {}ms...",
                attempt,
                location,
                reason,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        } else {
            debug!("Final geocode attempt for '{location}' failed: {reason}");
        }
    }

    warn!("Geocoding '{location}' failed after {attempts} attempts");
    None
}

/// Per-request memo: each distinct location string is geocoded at most once.
/// Owned by a single request, never shared.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: HashMap<String, Option<Coordinates>>,
}

impl GeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(
        &mut self,
        geocoder: &dyn Geocoder,
        policy: &RetryPolicy,
        location: &str,
    ) -> Option<Coordinates> {
        let key = location.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if key.is_empty() {
            return None;
        }
        if let Some(cached) = self.entries.get(&key) {
            return *cached;
        }

        let resolved = resolve_with_retry(geocoder, location.trim(), policy).await;
        self.entries.insert(key, resolved);
        resolved
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
