// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for web search

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const UNKNOWN_SOURCE: &str = "Unknown source";

/// Host of `link` with any leading `www.` removed
pub fn source_domain(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// A single organic result from a search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    /// Domain the result lives on (e.g. "hdfcbank.com")
    pub source: String,
}

/// Response from a search operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub search_time_ms: u64,
    /// Provider that answered
    pub provider: String,
    pub cached: bool,
}

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Search API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Search timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Every configured provider failed or none is configured
    #[error("Provider unavailable: {provider}")]
    ProviderUnavailable { provider: String },

    #[error("No API key configured for {provider}")]
    NoApiKey { provider: String },

    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("Web search disabled")]
    SearchDisabled,
}
