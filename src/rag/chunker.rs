// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sliding-window text chunking for the indexer

use super::errors::RagError;

pub const DEFAULT_CHUNK_SIZE: usize = 512;
pub const DEFAULT_CHUNK_OVERLAP: usize = 64;

/// Character-based sliding window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, RagError> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(RagError::InvalidChunking {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Collapse all whitespace runs to single spaces, then cut windows of
    /// `chunk_size` characters starting every `chunk_size - overlap`.
    pub fn split(&self, text: &str) -> Vec<String> {
        let collapsed: Vec<char> = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .collect();

        (0..collapsed.len())
            .step_by(self.step())
            .map(|start| {
                let end = (start + self.chunk_size).min(collapsed.len());
                collapsed[start..end].iter().collect()
            })
            .collect()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}
