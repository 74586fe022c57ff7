use tracing::{info, warn};

use super::{haversine_km, Coordinates, GeocodeCache, Geocoder, RetryPolicy};
use crate::matching::catalog::JobCatalog;
use crate::matching::ranking::{select_top_n, RankOrder};
use crate::models::matches::{LocatedMatch, MatchResult};

pub const RESUME_LOCATION_WARNING: &str = "Could not geocode resume location";

#[derive(Debug, Clone)]
pub struct LocationRanking {
    pub matches: Vec<LocatedMatch>,
    pub location_sorted: bool,
    pub warning: Option<String>,
    pub resume_coordinates: Option<Coordinates>,
}

impl LocationRanking {
    /// Score order, truncated, with no location annotations.
    fn unsorted(semantic: Vec<MatchResult>, top_n: usize, warning: Option<String>) -> Self {
        Self {
            matches: semantic
                .into_iter()
                .take(top_n)
                .map(LocatedMatch::from)
                .collect(),
            location_sorted: false,
            warning,
            resume_coordinates: None,
        }
    }
}

fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// Re-ranks score-ordered matches by distance from `location`.
///
/// Job coordinates come from the catalog when the builder resolved them,
/// otherwise from the geocoder through a per-request cache. Jobs whose
/// location cannot be resolved sort after every located job. If the resume
/// location itself cannot be resolved the matches keep their score order and
/// `location_sorted` is false.
pub async fn rank_by_location(
    semantic: Vec<MatchResult>,
    catalog: &JobCatalog,
    location: Option<&str>,
    geocoder: &dyn Geocoder,
    policy: &RetryPolicy,
    top_n: usize,
) -> LocationRanking {
    let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) else {
        return LocationRanking::unsorted(semantic, top_n, None);
    };

    let mut cache = GeocodeCache::new();
    let Some(origin) = cache.resolve(geocoder, policy, location).await else {
        warn!("Could not geocode resume location '{location}', falling back to score order");
        return LocationRanking::unsorted(
            semantic,
            top_n,
            Some(RESUME_LOCATION_WARNING.to_string()),
        );
    };

    let mut located = Vec::with_capacity(semantic.len());
    for result in semantic {
        let job = catalog.get(result.catalog_index);
        let coords = match job.and_then(|j| j.coordinates) {
            Some(c) => Some(c),
            None => match job {
                Some(j) => cache.resolve(geocoder, policy, &j.details.location).await,
                None => None,
            },
        };

        located.push(LocatedMatch {
            distance_km: coords.map(|c| round_km(haversine_km(origin, c))),
            job_coordinates: coords,
            ..LocatedMatch::from(result)
        });
    }

    let mut matches = select_top_n(located, top_n, RankOrder::ByDistance);
    for (rank, m) in matches.iter_mut().enumerate() {
        m.location_rank = Some(rank + 1);
    }

    info!(
        "Location ranking for '{}': {} matches, {} lookups",
        location,
        matches.len(),
        cache.len()
    );

    LocationRanking {
        matches,
        location_sorted: true,
        warning: None,
        resume_coordinates: Some(origin),
    }
}
