// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

/// Errors returned by completion and embedding backends
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    /// No credential configured; the backend is running degraded
    #[error("No API key configured for {backend}")]
    NoApiKey { backend: String },

    #[error("Backend rejected credentials ({status})")]
    Unauthorized { status: u16 },

    #[error("Rate limited by backend")]
    RateLimited,

    #[error("Backend API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Completion timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed backend response: {0}")]
    InvalidResponse(String),

    /// Backend answered but produced no text
    #[error("Backend returned no choices")]
    EmptyResponse,
}

impl CompletionError {
    /// Whether retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited
                | CompletionError::Timeout { .. }
                | CompletionError::Transport(_)
        ) || matches!(self, CompletionError::Api { status, .. } if *status >= 500)
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout { timeout_ms: 0 }
        } else if err.is_decode() {
            CompletionError::InvalidResponse(err.to_string())
        } else {
            CompletionError::Transport(err.to_string())
        }
    }
}
