// Matching engine: text encoding, catalog, similarity, weighting, ranking.
// Everything here is synchronous and CPU-bound; handlers run it on blocking threads.

pub mod builder;
pub mod catalog;
pub mod combiner;
pub mod encoder;
pub mod engine;
pub mod handlers;
pub mod ranking;
pub mod similarity;
pub mod text;
