//! Text Encoder: turns text fields into fixed-length, L2-normalized embeddings.
//!
//! Default: `FastEmbedEncoder` (all-MiniLM-L6-v2 through ONNX, 384 dims).
//! `HashingEncoder` is a deterministic feature-hashing stand-in used for
//! offline development and tests. `AppState` holds an `Arc<dyn TextEncoder>`.

use std::hash::{Hash, Hasher};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;
use thiserror::Error;
use tracing::{debug, info};

use crate::matching::text::{normalize_text, TEXT_FORMAT};

pub type Embedding = Vec<f32>;

pub const MINILM_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const MINILM_DIMENSION: usize = 384;
const FASTEMBED_BATCH_SIZE: usize = 32;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("failed to load embedding model: {0}")]
    Load(String),

    #[error("embedding inference failed: {0}")]
    Inference(String),

    #[error("encoder returned {found} embeddings for {expected} texts")]
    Count { expected: usize, found: usize },

    #[error("encoder returned a {found}-dimensional embedding, expected {expected}")]
    Dimension { expected: usize, found: usize },
}

/// Everything that must agree between a catalog artifact and the running
/// encoder for similarities to be meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderIdentity {
    pub model_id: String,
    pub dimension: usize,
    pub text_format: String,
}

impl std::fmt::Display for EncoderIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} dims, text format {})",
            self.model_id, self.dimension, self.text_format
        )
    }
}

/// The encoder trait. Implementations only do raw model inference; text
/// normalization, the empty-text shortcut and L2 normalization live in the
/// provided `encode`/`encode_batch` methods so every backend behaves the same.
pub trait TextEncoder: Send + Sync {
    fn model_id(&self) -> &str;

    fn dimension(&self) -> usize;

    /// Embeds already-normalized, non-empty texts.
    fn embed_raw(&self, texts: &[String]) -> Result<Vec<Embedding>, EncoderError>;

    fn identity(&self) -> EncoderIdentity {
        EncoderIdentity {
            model_id: self.model_id().to_string(),
            dimension: self.dimension(),
            text_format: TEXT_FORMAT.to_string(),
        }
    }

    fn encode(&self, text: &str) -> Result<Embedding, EncoderError> {
        encode_prepared(self, &[text])?
            .pop()
            .ok_or(EncoderError::Count {
                expected: 1,
                found: 0,
            })
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EncoderError> {
        encode_prepared(self, texts)
    }
}

/// Normalizes texts, embeds the non-empty ones and returns one unit-length
/// (or zero) vector per input, in input order.
fn encode_prepared<E: TextEncoder + ?Sized>(
    encoder: &E,
    texts: &[&str],
) -> Result<Vec<Embedding>, EncoderError> {
    let dimension = encoder.dimension();
    let normalized: Vec<String> = texts.iter().map(|t| normalize_text(t)).collect();

    let mut output = vec![vec![0.0_f32; dimension]; texts.len()];
    let (indices, pending): (Vec<usize>, Vec<String>) = normalized
        .into_iter()
        .enumerate()
        .filter(|(_, t)| !t.is_empty())
        .unzip();

    if pending.is_empty() {
        return Ok(output);
    }

    let embedded_count = pending.len();
    let embedded = encoder.embed_raw(&pending)?;
    if embedded.len() != embedded_count {
        return Err(EncoderError::Count {
            expected: embedded_count,
            found: embedded.len(),
        });
    }

    for (idx, mut vector) in indices.into_iter().zip(embedded) {
        if vector.len() != dimension {
            return Err(EncoderError::Dimension {
                expected: dimension,
                found: vector.len(),
            });
        }
        l2_normalize(&mut vector);
        output[idx] = vector;
    }

    debug!(texts = texts.len(), embedded = embedded_count, "encoded batch");
    Ok(output)
}

pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderBackend {
    FastEmbed,
    Hashing,
}

impl FromStr for EncoderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fastembed" | "minilm" => Ok(Self::FastEmbed),
            "hashing" | "hash" => Ok(Self::Hashing),
            other => Err(format!(
                "unknown encoder backend '{other}' (expected 'fastembed' or 'hashing')"
            )),
        }
    }
}

impl EncoderBackend {
    /// Identity of the backend, known without loading the model.
    pub fn identity(self) -> EncoderIdentity {
        let (model_id, dimension) = match self {
            Self::FastEmbed => (MINILM_MODEL_ID, MINILM_DIMENSION),
            Self::Hashing => (HASHING_MODEL_ID, MINILM_DIMENSION),
        };
        EncoderIdentity {
            model_id: model_id.to_string(),
            dimension,
            text_format: TEXT_FORMAT.to_string(),
        }
    }

    /// Loads the backend. Slow for `FastEmbed` (model download + ONNX session).
    pub fn load(self, cache_dir: Option<&Path>) -> Result<Arc<dyn TextEncoder>, EncoderError> {
        match self {
            Self::FastEmbed => Ok(Arc::new(FastEmbedEncoder::load(cache_dir)?)),
            Self::Hashing => Ok(Arc::new(HashingEncoder::new(MINILM_DIMENSION))),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FastEmbedEncoder: default backend
// ────────────────────────────────────────────────────────────────────────────

/// all-MiniLM-L6-v2 sentence embeddings through fastembed's ONNX runtime.
pub struct FastEmbedEncoder {
    model: TextEmbedding,
}

impl FastEmbedEncoder {
    pub fn load(cache_dir: Option<&Path>) -> Result<Self, EncoderError> {
        info!("Loading embedding model {MINILM_MODEL_ID}...");

        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir.to_path_buf());
        }

        let model = TextEmbedding::try_new(options).map_err(|e| EncoderError::Load(e.to_string()))?;

        info!("Embedding model loaded");
        Ok(Self { model })
    }
}

impl TextEncoder for FastEmbedEncoder {
    fn model_id(&self) -> &str {
        MINILM_MODEL_ID
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }

    fn embed_raw(&self, texts: &[String]) -> Result<Vec<Embedding>, EncoderError> {
        self.model
            .embed(texts.to_vec(), Some(FASTEMBED_BATCH_SIZE))
            .map_err(|e| EncoderError::Inference(e.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HashingEncoder: deterministic bag-of-words stand-in
// ────────────────────────────────────────────────────────────────────────────

pub const HASHING_MODEL_ID: &str = "hashing-siphash13-v1";

// Changing these seeds changes every embedding; bump HASHING_MODEL_ID with them.
const HASH_SEED_K0: u64 = 0x6a6f_625f_6d61_7463;
const HASH_SEED_K1: u64 = 0x685f_7265_7375_6d65;

/// Signed feature hashing over word tokens. Texts sharing words get
/// positive similarity, disjoint texts get roughly zero.
pub struct HashingEncoder {
    dimension: usize,
}

impl HashingEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(&self, token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn embed_one(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0_f32; self.dimension];
        for token in text
            .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .filter(|t| !t.is_empty())
        {
            let h = self.hash(token);
            let idx = (h % self.dimension as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }
        vector
    }
}

impl TextEncoder for HashingEncoder {
    fn model_id(&self) -> &str {
        HASHING_MODEL_ID
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_raw(&self, texts: &[String]) -> Result<Vec<Embedding>, EncoderError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
