// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Exact nearest-neighbour search over unit vectors
//!
//! Vectors are normalised on insert and queries are normalised on search, so
//! inner product is cosine similarity. Results are reported as distances
//! (`1 - similarity`) to match the gate's lower-is-better convention.

use serde::{Deserialize, Serialize};

use super::errors::KnowledgeBaseError;
use crate::embeddings::normalize;

/// One search hit: row ordinal plus distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub ordinal: usize,
    pub distance: f32,
}

/// Black-box k-NN lookup the pipeline depends on
pub trait NearestNeighborStore: Send + Sync {
    /// Top `k` rows closest to `query`, ascending by distance
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, KnowledgeBaseError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Row-major flat index; the row ordinal is the vector id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFlatIndex")]
pub struct FlatIndex {
    dimensions: usize,
    data: Vec<f32>,
}

/// Decoded but unchecked index contents
#[derive(Deserialize)]
struct RawFlatIndex {
    dimensions: usize,
    data: Vec<f32>,
}

impl TryFrom<RawFlatIndex> for FlatIndex {
    type Error = KnowledgeBaseError;

    fn try_from(raw: RawFlatIndex) -> Result<Self, Self::Error> {
        if raw.dimensions == 0 {
            return Err(KnowledgeBaseError::ZeroDimension);
        }
        if raw.data.len() % raw.dimensions != 0 {
            return Err(KnowledgeBaseError::RaggedIndex {
                values: raw.data.len(),
                dimensions: raw.dimensions,
            });
        }
        Ok(Self {
            dimensions: raw.dimensions,
            data: raw.data,
        })
    }
}

impl FlatIndex {
    pub fn new(dimensions: usize) -> Result<Self, KnowledgeBaseError> {
        if dimensions == 0 {
            return Err(KnowledgeBaseError::ZeroDimension);
        }
        Ok(Self {
            dimensions,
            data: Vec::new(),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Append a vector and return its ordinal
    pub fn add(&mut self, vector: &[f32]) -> Result<usize, KnowledgeBaseError> {
        self.check_dimensions(vector.len())?;

        let ordinal = self.len();
        let start = self.data.len();
        self.data.extend_from_slice(vector);
        normalize(&mut self.data[start..]);
        Ok(ordinal)
    }

    fn check_dimensions(&self, actual: usize) -> Result<(), KnowledgeBaseError> {
        if actual != self.dimensions {
            return Err(KnowledgeBaseError::DimensionMismatch {
                expected: self.dimensions,
                actual,
            });
        }
        Ok(())
    }

    fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimensions)
    }
}

impl NearestNeighborStore for FlatIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, KnowledgeBaseError> {
        self.check_dimensions(query.len())?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut query = query.to_vec();
        normalize(&mut query);

        let mut hits: Vec<Neighbor> = self
            .rows()
            .enumerate()
            .map(|(ordinal, row)| {
                let similarity: f32 = row.iter().zip(&query).map(|(a, b)| a * b).sum();
                Neighbor {
                    ordinal,
                    distance: 1.0 - similarity,
                }
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimensions
    }
}
