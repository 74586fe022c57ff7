//! Offline catalog construction: job table → embeddings (+ coordinates) → artifact.

use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::geo::{GeocodeCache, Geocoder, RetryPolicy};
use crate::matching::catalog::CatalogArtifact;
use crate::matching::encoder::{EncoderError, TextEncoder};
use crate::matching::text;
use crate::models::job::{JobDetails, JobEmbeddings, JobRecord};

/// One row of the source job table. Headers follow the spreadsheet export;
/// any missing column reads as empty text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JobRow {
    #[serde(rename = "job title")]
    job_title: String,
    company: String,
    location: String,
    #[serde(rename = "job description")]
    job_description: String,
    #[serde(rename = "required qualification")]
    required_qualification: String,
    skills: String,
}

impl From<JobRow> for JobDetails {
    fn from(row: JobRow) -> Self {
        Self {
            job_title: row.job_title,
            company: row.company,
            location: row.location,
            job_description: row.job_description,
            required_qualification: row.required_qualification,
            skills: row.skills,
        }
    }
}

pub fn read_job_table(path: &Path) -> Result<Vec<JobDetails>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    reader
        .deserialize::<JobRow>()
        .map(|row| row.map(JobDetails::from))
        .collect()
}

/// Embeds the three job-side dimensions for every job, `batch_size` jobs per
/// encoder call. Job ids are row positions.
pub fn embed_jobs(
    encoder: &dyn TextEncoder,
    jobs: Vec<JobDetails>,
    batch_size: usize,
) -> Result<Vec<JobRecord>, EncoderError> {
    let batch_size = batch_size.max(1);
    let total = jobs.len();
    let mut records = Vec::with_capacity(total);

    for (batch_index, batch) in jobs.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch
            .iter()
            .flat_map(|job| {
                [
                    text::position_text(&job.job_title),
                    text::job_skills_text(job),
                    text::qualification_text(&job.required_qualification),
                ]
            })
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let mut vectors = encoder.encode_batch(&refs)?.into_iter();
        for (offset, job) in batch.iter().enumerate() {
            let (Some(position), Some(skills), Some(qualification)) =
                (vectors.next(), vectors.next(), vectors.next())
            else {
                return Err(EncoderError::Count {
                    expected: texts.len(),
                    found: offset * 3,
                });
            };

            records.push(JobRecord {
                id: batch_index * batch_size + offset,
                details: job.clone(),
                embeddings: JobEmbeddings {
                    position,
                    skills,
                    qualification,
                },
                coordinates: None,
            });
        }

        info!("Embedded {}/{} jobs", records.len(), total);
    }

    Ok(records)
}

/// Resolves job coordinates once at build time. Returns how many jobs were located.
pub async fn geocode_jobs(
    records: &mut [JobRecord],
    geocoder: &dyn Geocoder,
    policy: &RetryPolicy,
) -> usize {
    let mut cache = GeocodeCache::new();
    let mut resolved = 0;

    for record in records.iter_mut() {
        record.coordinates = cache
            .resolve(geocoder, policy, &record.details.location)
            .await;
        match record.coordinates {
            Some(_) => resolved += 1,
            None if !record.details.location.trim().is_empty() => warn!(
                "Could not geocode job {} location '{}'",
                record.id, record.details.location
            ),
            None => {}
        }
    }

    info!(
        "Geocoded {}/{} jobs ({} distinct locations)",
        resolved,
        records.len(),
        cache.len()
    );
    resolved
}

pub fn into_artifact(encoder: &dyn TextEncoder, jobs: Vec<JobRecord>) -> CatalogArtifact {
    CatalogArtifact {
        identity: encoder.identity(),
        built_at: Some(Utc::now()),
        jobs,
    }
}
