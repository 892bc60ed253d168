// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Persisted knowledge base
//!
//! A bincode-encoded [`FlatIndex`], tagged with the embedding model that
//! produced it, and a JSON list of [`DocumentChunk`]s.
//! Row `i` of the index is described by entry `i` of the list; the two files
//! are always written and read as a pair.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

use super::errors::KnowledgeBaseError;
use super::store::{FlatIndex, NearestNeighborStore};
use super::types::{DocumentChunk, Passage};

#[derive(Serialize)]
struct IndexFileRef<'a> {
    embedder: &'a str,
    index: &'a FlatIndex,
}

#[derive(Deserialize)]
struct IndexFile {
    embedder: String,
    index: FlatIndex,
}

pub struct KnowledgeBase {
    index: FlatIndex,
    documents: Vec<DocumentChunk>,
    embedder: String,
}

impl KnowledgeBase {
    /// Pair `documents[i]` with `vectors[i]`
    pub fn build(
        documents: Vec<DocumentChunk>,
        vectors: &[Vec<f32>],
    ) -> Result<Self, KnowledgeBaseError> {
        if documents.len() != vectors.len() {
            return Err(KnowledgeBaseError::LengthMismatch {
                vectors: vectors.len(),
                documents: documents.len(),
            });
        }

        let dimensions = vectors.first().map(Vec::len).unwrap_or(1);
        let mut index = FlatIndex::new(dimensions)?;
        for vector in vectors {
            index.add(vector)?;
        }

        Ok(Self {
            index,
            documents,
            embedder: String::new(),
        })
    }

    /// Record the embedding model that produced the vectors
    pub fn with_embedder(mut self, model: impl Into<String>) -> Self {
        self.embedder = model.into();
        self
    }

    /// Embedding model recorded at build time, empty when unknown
    pub fn embedder(&self) -> &str {
        &self.embedder
    }

    /// Fail unless queries embedded by `model` are comparable with the index
    pub fn check_embedder(&self, model: &str) -> Result<(), KnowledgeBaseError> {
        if self.embedder.is_empty() || self.embedder == model {
            return Ok(());
        }
        Err(KnowledgeBaseError::EmbedderMismatch {
            index: self.embedder.clone(),
            query: model.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    pub fn documents(&self) -> &[DocumentChunk] {
        &self.documents
    }

    /// Write both files. The metadata file is written first so a reader never
    /// sees a new index next to stale metadata of a different length.
    pub fn save(&self, index_path: &Path, docs_path: &Path) -> Result<(), KnowledgeBaseError> {
        let docs_tmp = docs_path.with_extension("json.tmp");
        let index_tmp = index_path.with_extension("bin.tmp");

        let mut docs_writer = BufWriter::new(File::create(&docs_tmp)?);
        serde_json::to_writer(&mut docs_writer, &self.documents)?;
        docs_writer.flush()?;

        let mut index_writer = BufWriter::new(File::create(&index_tmp)?);
        let file = IndexFileRef {
            embedder: &self.embedder,
            index: &self.index,
        };
        bincode::serialize_into(&mut index_writer, &file)?;
        index_writer.flush()?;

        fs::rename(&docs_tmp, docs_path)?;
        fs::rename(&index_tmp, index_path)?;

        info!(
            "Saved knowledge base: {} chunks, {}D -> {} + {}",
            self.len(),
            self.dimensions(),
            index_path.display(),
            docs_path.display()
        );
        Ok(())
    }

    /// Read both files and verify they describe the same rows
    pub fn load(index_path: &Path, docs_path: &Path) -> Result<Self, KnowledgeBaseError> {
        for path in [index_path, docs_path] {
            if !path.exists() {
                return Err(KnowledgeBaseError::NotFound(path.to_path_buf()));
            }
        }

        let IndexFile { embedder, index } =
            bincode::deserialize_from(BufReader::new(File::open(index_path)?))?;
        let documents: Vec<DocumentChunk> =
            serde_json::from_reader(BufReader::new(File::open(docs_path)?))?;

        if index.len() != documents.len() {
            return Err(KnowledgeBaseError::LengthMismatch {
                vectors: index.len(),
                documents: documents.len(),
            });
        }

        info!(
            "Loaded knowledge base: {} chunks, {}D, embedder '{}'",
            documents.len(),
            index.dimensions(),
            embedder
        );
        Ok(Self {
            index,
            documents,
            embedder,
        })
    }

    /// Nearest passages to an already-embedded query
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Passage>, KnowledgeBaseError> {
        let hits = self.index.search(query, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                self.documents
                    .get(hit.ordinal)
                    .map(|doc| Passage::local(&doc.source, &doc.text, hit.distance))
            })
            .collect())
    }
}
