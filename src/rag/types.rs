// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::search::SearchResult;

/// Where a passage came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassageOrigin {
    Local,
    Web,
}

/// One metadata row of the knowledge base, parallel to an index vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub source: String,
    pub text: String,
}

/// A retrieved unit of evidence
///
/// For local passages `score` is a cosine distance (`1 - similarity`), so
/// lower means more similar. Web passages carry a score of `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub source: String,
    pub text: String,
    pub score: f32,
    pub origin: PassageOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Passage {
    pub fn local(source: impl Into<String>, text: impl Into<String>, distance: f32) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
            score: distance,
            origin: PassageOrigin::Local,
            title: None,
        }
    }

    pub fn web(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            source: link.into(),
            text: snippet.into(),
            score: 0.0,
            origin: PassageOrigin::Web,
            title: Some(title.into()),
        }
    }

    pub fn is_local(&self) -> bool {
        self.origin == PassageOrigin::Local
    }
}

impl From<SearchResult> for Passage {
    fn from(result: SearchResult) -> Self {
        Passage::web(result.title, result.url, result.snippet)
    }
}

/// Provenance label of an assembled context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "local+web")]
    LocalAndWeb,
    #[serde(rename = "web")]
    Web,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Local => write!(f, "local"),
            Provenance::LocalAndWeb => write!(f, "local+web"),
            Provenance::Web => write!(f, "web"),
        }
    }
}
