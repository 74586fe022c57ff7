//! Ranking Selector: stable ordering and top-N truncation.

use std::cmp::Ordering;

use crate::models::matches::{LocatedMatch, MatchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Raw weighted score descending.
    ByScore,
    /// `distance_km` ascending (unknown distances last), then raw score descending.
    ByDistance,
}

/// Anything the selector can order.
pub trait Rankable {
    /// Ordering key. The unclipped score, so jobs below zero still rank apart.
    fn rank_score(&self) -> f64;

    fn distance_km(&self) -> Option<f64> {
        None
    }
}

impl Rankable for MatchResult {
    fn rank_score(&self) -> f64 {
        self.raw_score
    }
}

impl Rankable for LocatedMatch {
    fn rank_score(&self) -> f64 {
        self.result.raw_score
    }

    fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }
}

fn by_score_desc<T: Rankable>(a: &T, b: &T) -> Ordering {
    b.rank_score().total_cmp(&a.rank_score())
}

fn by_distance_asc<T: Rankable>(a: &T, b: &T) -> Ordering {
    match (a.distance_km(), b.distance_km()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts with a stable sort and keeps the first `n`. Elements with equal
/// keys keep their input order, so `len == min(n, results.len())` and ties
/// resolve the same way on every call.
pub fn select_top_n<T: Rankable>(mut results: Vec<T>, n: usize, order: RankOrder) -> Vec<T> {
    match order {
        RankOrder::ByScore => results.sort_by(by_score_desc),
        RankOrder::ByDistance => {
            results.sort_by(|a, b| by_distance_asc(a, b).then_with(|| by_score_desc(a, b)))
        }
    }
    results.truncate(n);
    results
}
