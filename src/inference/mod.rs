// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Language-model completion boundary
//!
//! The call bridge and the answer pipeline only see the [`CompletionClient`]
//! trait. [`mistral::MistralClient`] is the production backend.

pub mod errors;
pub mod mistral;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use errors::CompletionError;
pub use mistral::{MistralClient, MistralConfig};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in a conversation. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling knobs for a single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionOptions {
    /// Short replies suited to text-to-speech
    pub fn voice(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
        }
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: None,
            temperature: Some(0.7),
        }
    }
}

/// Identity of the backend, reported by the completion check endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub model: String,
    pub agent_id: Option<String>,
}

/// Generates assistant text from an ordered list of turns
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion over `turns` and return the assistant text
    async fn complete(
        &self,
        turns: &[Turn],
        options: &CompletionOptions,
    ) -> Result<String, CompletionError>;

    /// Model / agent this client talks to
    fn backend(&self) -> BackendInfo;
}
