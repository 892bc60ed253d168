// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Answer pipeline configuration

use std::env;
use std::path::PathBuf;

use super::gate::DEFAULT_QUALITY_THRESHOLD;

/// Temperature for grounded QA answers
pub const DEFAULT_QA_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct RagConfig {
    pub index_path: PathBuf,
    pub docs_path: PathBuf,
    /// Passages retrieved from the knowledge base per question
    pub top_k: usize,
    /// Distance above which the web is consulted
    pub quality_threshold: f32,
    pub web_results: usize,
    pub temperature: f32,
}

impl RagConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            index_path: env::var("RAG_INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_path),
            docs_path: env::var("RAG_DOCS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.docs_path),
            top_k: env::var("RAG_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|k| *k > 0)
                .unwrap_or(defaults.top_k),
            quality_threshold: env::var("RAG_QUALITY_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|t: &f32| t.is_finite())
                .unwrap_or(defaults.quality_threshold),
            web_results: defaults.web_results,
            temperature: defaults.temperature,
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("index.bin"),
            docs_path: PathBuf::from("docs.json"),
            top_k: 6,
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            web_results: 5,
            temperature: DEFAULT_QA_TEMPERATURE,
        }
    }
}
