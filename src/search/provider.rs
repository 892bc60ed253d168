// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search provider trait definition

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;

use super::types::{SearchError, SearchResult};

/// Seconds to back off after an HTTP 429 without a usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// A web search backend
///
/// The service tries available providers in ascending `priority()` order and
/// falls through to the next one on error.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, num_results: usize)
        -> Result<Vec<SearchResult>, SearchError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Whether the provider has what it needs (API key, etc.)
    fn is_available(&self) -> bool;

    /// Lower is preferred
    fn priority(&self) -> u8 {
        100
    }
}

/// Map a failed send to `Timeout` or a status-less `ApiError`
pub(crate) fn transport_error(err: reqwest::Error, timeout_ms: u64) -> SearchError {
    if err.is_timeout() {
        SearchError::Timeout { timeout_ms }
    } else {
        SearchError::ApiError {
            status: 0,
            message: err.to_string(),
        }
    }
}

/// Error for a non-success HTTP status, `None` on 2xx
pub(crate) fn status_error(provider: &str, status: u16, body: String) -> Option<SearchError> {
    match status {
        200..=299 => None,
        429 => Some(SearchError::RateLimited {
            retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
        }),
        401 | 403 => Some(SearchError::NoApiKey {
            provider: provider.to_string(),
        }),
        _ => Some(SearchError::ApiError {
            status,
            message: body,
        }),
    }
}

/// Check the status, then decode the body as `T`
pub(crate) async fn decode_response<T: DeserializeOwned>(
    provider: &str,
    response: Response,
) -> Result<T, SearchError> {
    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        if let Some(err) = status_error(provider, status, body) {
            return Err(err);
        }
        // status_error only returns None for 2xx, which is_success() excludes
        unreachable!("non-success status {} produced no error", status);
    }

    response.json::<T>().await.map_err(|e| SearchError::ApiError {
        status: 0,
        message: format!("{} returned unreadable JSON: {}", provider, e),
    })
}
