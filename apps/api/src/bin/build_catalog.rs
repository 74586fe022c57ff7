//! Builds the precomputed job catalog artifact from a CSV job table.
//!
//! Must run with the same `ENCODER_BACKEND` as the API server; the artifact
//! records the encoder identity and the server rejects a mismatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use job_matcher::config::Config;
use job_matcher::geo::NominatimGeocoder;
use job_matcher::matching::builder::{embed_jobs, geocode_jobs, into_artifact, read_job_table};
use job_matcher::matching::catalog::save_artifact;

#[derive(Debug, Parser)]
#[command(name = "build-catalog", about = "Embed a job table into a catalog artifact")]
struct Args {
    /// CSV with columns: job title, company, location, job description,
    /// required qualification, skills
    input: PathBuf,

    /// Where to write the catalog JSON
    #[arg(default_value = "job_embeddings.json")]
    output: PathBuf,

    /// Resolve job locations to coordinates while building
    #[arg(long)]
    geocode: bool,

    /// Jobs per encoder call
    #[arg(long, default_value_t = 32)]
    batch_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={level},job_matcher={level}",
                env!("CARGO_CRATE_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let jobs = read_job_table(&args.input)
        .with_context(|| format!("reading job table {}", args.input.display()))?;
    info!("Read {} jobs from {}", jobs.len(), args.input.display());

    let backend = config.encoder_backend;
    let cache_dir = config.model_cache_dir.clone();
    let batch_size = args.batch_size;
    let (encoder, mut records) = tokio::task::spawn_blocking(move || -> Result<_> {
        let encoder = backend.load(cache_dir.as_deref())?;
        let records = embed_jobs(encoder.as_ref(), jobs, batch_size)?;
        Ok((encoder, records))
    })
    .await??;

    if args.geocode {
        let geocoder = NominatimGeocoder::new(
            &config.geocoder_url,
            &config.geocoder_user_agent,
            config.geocode_timeout,
            config.geocode_min_interval,
        )?;
        geocode_jobs(&mut records, &geocoder, &config.retry_policy()).await;
    }

    let artifact = into_artifact(encoder.as_ref(), records);
    save_artifact(&args.output, &artifact)
        .with_context(|| format!("writing catalog {}", args.output.display()))?;

    info!(
        "Saved {} jobs to {} ({})",
        artifact.jobs.len(),
        args.output.display(),
        artifact.identity
    );
    Ok(())
}
