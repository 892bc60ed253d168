// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the knowledge base and the answer pipeline
//!
//! - `KnowledgeBaseError`: building, persisting and loading the index pair
//! - `RagError`: per-query failures surfaced to callers of the pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::embeddings::EmbeddingError;
use crate::inference::CompletionError;

/// Errors from the on-disk index + metadata pair
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    /// Index or metadata file missing
    #[error("Knowledge base file not found: {0}")]
    NotFound(PathBuf),

    /// Index and metadata describe a different number of rows
    #[error("Index holds {vectors} vectors but metadata lists {documents} documents")]
    LengthMismatch { vectors: usize, documents: usize },

    #[error("Dimension mismatch: index is {expected}D, got {actual}D vector")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index dimension must be greater than 0")]
    ZeroDimension,

    /// Stored values do not divide into whole rows
    #[error("Index holds {values} values, not a multiple of {dimensions}")]
    RaggedIndex { values: usize, dimensions: usize },

    /// The index was built by a different embedding model than the one querying it
    #[error("Index was built with embedder '{index}' but queries use '{query}'")]
    EmbedderMismatch { index: String, query: String },

    #[error("Failed to encode or decode index: {0}")]
    IndexCodec(#[from] bincode::Error),

    #[error("Failed to encode or decode metadata: {0}")]
    MetadataCodec(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KnowledgeBaseError {
    /// Get error code for logging
    pub fn error_code(&self) -> &'static str {
        match self {
            KnowledgeBaseError::NotFound(_) => "KB_NOT_FOUND",
            KnowledgeBaseError::LengthMismatch { .. } => "KB_LENGTH_MISMATCH",
            KnowledgeBaseError::DimensionMismatch { .. } => "KB_DIMENSION_MISMATCH",
            KnowledgeBaseError::ZeroDimension => "KB_ZERO_DIMENSION",
            KnowledgeBaseError::RaggedIndex { .. } => "KB_RAGGED_INDEX",
            KnowledgeBaseError::EmbedderMismatch { .. } => "KB_EMBEDDER_MISMATCH",
            KnowledgeBaseError::IndexCodec(_) => "KB_INDEX_CODEC",
            KnowledgeBaseError::MetadataCodec(_) => "KB_METADATA_CODEC",
            KnowledgeBaseError::Io(_) => "KB_IO",
        }
    }
}

/// Errors for a single question put to the answer pipeline
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    /// Neither the knowledge base nor the web produced a passage
    #[error("No relevant information available")]
    NoInformation,

    #[error("Invalid chunking: chunk size {chunk_size} with overlap {overlap}")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    KnowledgeBase(#[from] KnowledgeBaseError),
}

impl RagError {
    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            RagError::EmptyQuestion => "Error: Question cannot be empty".to_string(),
            RagError::NoInformation => {
                "Error: No relevant documents found or retrieval failed".to_string()
            }
            RagError::Completion(e) => format!("Error generating response: {}", e),
            _ => format!("Error: {}", self),
        }
    }

    /// Whether the failure ends only this query (the session may continue)
    pub fn is_query_scoped(&self) -> bool {
        matches!(
            self,
            RagError::EmptyQuestion | RagError::NoInformation | RagError::Completion(_)
        )
    }
}
