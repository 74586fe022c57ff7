use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Display fields of a job posting. This is what match results expose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDetails {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub job_description: String,
    pub required_qualification: String,
    #[serde(default)]
    pub skills: String,
}

/// Per-dimension embeddings of one job, all of the catalog dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEmbeddings {
    pub position: Vec<f32>,
    pub skills: Vec<f32>,
    pub qualification: Vec<f32>,
}

/// One catalog entry as stored in the artifact and held in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: usize,
    pub details: JobDetails,
    pub embeddings: JobEmbeddings,
    /// Resolved by the catalog builder; `None` when the location could not be geocoded.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}
