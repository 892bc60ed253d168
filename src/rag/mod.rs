// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrieval-augmented answering
//!
//! An offline-built flat index of document chunks, a quality gate that
//! decides when the web has to supplement local retrieval, and a context
//! assembler that numbers passages for citation.

pub mod chunker;
pub mod config;
pub mod context;
pub mod errors;
pub mod gate;
pub mod knowledge_base;
pub mod pipeline;
pub mod store;
pub mod types;

pub use chunker::Chunker;
pub use config::RagConfig;
pub use context::{assemble, CitedPassage, Context};
pub use errors::{KnowledgeBaseError, RagError};
pub use gate::{gate, GateDecision, RetrievalGate, DEFAULT_GATE_THRESHOLD, DEFAULT_QUALITY_THRESHOLD};
pub use knowledge_base::KnowledgeBase;
pub use pipeline::{AskOptions, RagAnswer, RagPipeline, QA_SYSTEM_INSTRUCTION};
pub use store::{FlatIndex, NearestNeighborStore, Neighbor};
pub use types::{DocumentChunk, Passage, PassageOrigin, Provenance};
