// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the FinBot bridge

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-voice-rag-bridge-2025-06-04";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-06-04";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "voice-websocket",
    "call-sessions",
    "mistral-completions",
    "mistral-agents",
    "rag-flat-index",
    "retrieval-gate",
    "web-search-fallback",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("FinBot Bridge {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
