//! Job Catalog: the precomputed artifact pairing job fields with embeddings.
//!
//! A catalog is either loaded whole or not at all: any record with a wrong
//! dimension or a non-finite value rejects the entire artifact, as does an
//! artifact built by a different encoder.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::matching::encoder::EncoderIdentity;
use crate::models::job::JobRecord;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog artifact not found at {0}")]
    Missing(PathBuf),

    #[error("failed to read catalog artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog artifact is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog was built with {found}, but the running encoder is {expected}; regenerate the artifact")]
    IdentityMismatch {
        expected: EncoderIdentity,
        found: EncoderIdentity,
    },

    #[error("job {job_id}: {field} embedding has {found} dimensions, expected {expected}")]
    Dimension {
        job_id: usize,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("job {job_id}: {field} embedding contains non-finite values")]
    NonFinite { job_id: usize, field: &'static str },
}

/// On-disk layout of the catalog artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogArtifact {
    #[serde(flatten)]
    pub identity: EncoderIdentity,
    #[serde(default)]
    pub built_at: Option<DateTime<Utc>>,
    pub jobs: Vec<JobRecord>,
}

/// Validated, immutable job catalog. Shared across requests behind an `Arc`.
#[derive(Debug, Clone)]
pub struct JobCatalog {
    identity: EncoderIdentity,
    jobs: Vec<JobRecord>,
}

impl JobCatalog {
    /// Reads and validates the artifact at `path` against the running encoder.
    pub fn load(path: &Path, expected: &EncoderIdentity) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::Missing(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        let artifact: CatalogArtifact = serde_json::from_reader(reader)?;
        let catalog = Self::from_artifact(artifact, expected)?;

        info!(
            "Loaded {} jobs from {} ({})",
            catalog.len(),
            path.display(),
            catalog.identity
        );
        Ok(catalog)
    }

    pub fn from_artifact(
        artifact: CatalogArtifact,
        expected: &EncoderIdentity,
    ) -> Result<Self, CatalogError> {
        if &artifact.identity != expected {
            return Err(CatalogError::IdentityMismatch {
                expected: expected.clone(),
                found: artifact.identity,
            });
        }

        for job in &artifact.jobs {
            validate_record(job, expected.dimension)?;
        }

        Ok(Self {
            identity: artifact.identity,
            jobs: artifact.jobs,
        })
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn get(&self, index: usize) -> Option<&JobRecord> {
        self.jobs.get(index)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn identity(&self) -> &EncoderIdentity {
        &self.identity
    }
}

fn validate_record(job: &JobRecord, dimension: usize) -> Result<(), CatalogError> {
    let fields: [(&'static str, &[f32]); 3] = [
        ("position", job.embeddings.position.as_slice()),
        ("skills", job.embeddings.skills.as_slice()),
        ("qualification", job.embeddings.qualification.as_slice()),
    ];

    for (field, vector) in fields {
        if vector.len() != dimension {
            return Err(CatalogError::Dimension {
                job_id: job.id,
                field,
                expected: dimension,
                found: vector.len(),
            });
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(CatalogError::NonFinite {
                job_id: job.id,
                field,
            });
        }
    }
    Ok(())
}

/// Writes an artifact to `path`, replacing any existing file.
pub fn save_artifact(path: &Path, artifact: &CatalogArtifact) -> Result<(), CatalogError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, artifact)?;
    Ok(())
}
