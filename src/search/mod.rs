// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web search fallback for the RAG pipeline
//!
//! Used when the local knowledge base has nothing close enough to the
//! question. Providers are tried in priority order (SerpAPI, then Brave),
//! results are cached by normalised query and outbound calls are rate
//! limited process-wide.

pub mod brave;
pub mod cache;
pub mod config;
pub mod provider;
pub mod rate_limiter;
pub mod serpapi;
pub mod service;
pub mod types;

pub use config::{SearchConfig, SearchProviderConfig};
pub use provider::SearchProvider;
pub use service::SearchService;
pub use types::{SearchError, SearchResponse, SearchResult};
