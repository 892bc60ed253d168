// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text embedding boundary
//!
//! Vectors handed to the knowledge base are always L2-normalised so that
//! inner product equals cosine similarity.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::inference::CompletionError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error(transparent)]
    Backend(#[from] CompletionError),

    #[error("Embedding count mismatch: sent {expected} texts, got {actual} vectors")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Invalid embedder configuration: {0}")]
    InvalidConfig(String),
}

/// Turns text into fixed-width vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed every text; output order matches input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn model_name(&self) -> &str;
}

/// Scale `vector` to unit length in place. Zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Embed `texts` in slices of `batch_size`, preserving order
pub async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if batch_size == 0 {
        return Err(EmbeddingError::InvalidConfig(
            "Batch size must be greater than 0".to_string(),
        ));
    }

    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size) {
        vectors.extend(embedder.embed(batch).await?);
    }
    Ok(vectors)
}

/// Deterministic offline embedder
///
/// Identical texts map to identical unit vectors; unrelated texts land close
/// to orthogonal. Used for dry runs of the indexer and in tests.
pub struct HashEmbedder {
    dimension: usize,
    name: String,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "Embedding dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            name: format!("hash-{}", dimension),
        })
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish();

        let mut embedding = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            // linear congruential step
            state = (state.wrapping_mul(1664525).wrapping_add(1013904223)) ^ (i as u64);
            let value = (state as f64 / u64::MAX as f64) * 2.0 - 1.0;
            embedding.push(value as f32);
        }

        normalize(&mut embedding);
        embedding
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    /// Includes the width, so indexes of different widths never match
    fn model_name(&self) -> &str {
        &self.name
    }
}
