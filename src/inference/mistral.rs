// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Mistral API backend
//!
//! Serves chat completions (or agent completions when an agent id is
//! configured) and embeddings over HTTPS.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

use super::{BackendInfo, CompletionClient, CompletionError, CompletionOptions, Turn};
use crate::embeddings::{normalize, Embedder, EmbeddingError};

const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";
const DEFAULT_MODEL: &str = "mistral-large-latest";
const DEFAULT_EMBED_MODEL: &str = "mistral-embed";
/// Placeholder shipped in sample `.env` files; treated as "no agent"
const AGENT_ID_PLACEHOLDER: &str = "your-agent-id";

/// Connection settings for the Mistral API
#[derive(Debug, Clone)]
pub struct MistralConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub agent_id: Option<String>,
    pub embed_model: String,
    pub request_timeout: Duration,
}

impl MistralConfig {
    /// Load configuration from environment variables
    ///
    /// Credentials have no fallback value; a missing key leaves the client
    /// in degraded mode where every call fails with `NoApiKey`.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("MISTRAL_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("MISTRAL_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: env::var("MISTRAL_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            agent_id: env::var("MISTRAL_AGENT_ID").ok(),
            embed_model: env::var("MISTRAL_EMBED_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string()),
            request_timeout: Duration::from_secs(
                env::var("MISTRAL_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Agent id, if one is configured and is not the sample placeholder
    pub fn effective_agent_id(&self) -> Option<&str> {
        self.agent_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != AGENT_ID_PLACEHOLDER)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for MistralConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            agent_id: None,
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Mistral chat, agents and embeddings endpoints
pub struct MistralClient {
    config: MistralConfig,
    client: Client,
}

impl MistralClient {
    pub fn new(config: MistralConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    pub fn config(&self) -> &MistralConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, CompletionError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| CompletionError::NoApiKey {
                backend: "mistral".to_string(),
            })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, CompletionError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(api_key)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        timeout_ms: self.config.request_timeout.as_millis() as u64,
                    }
                } else {
                    CompletionError::from(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimited);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CompletionError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl CompletionClient for MistralClient {
    async fn complete(
        &self,
        turns: &[Turn],
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let messages: Vec<WireMessage<'_>> = turns.iter().map(WireMessage::from).collect();

        let response: ChatResponse = match self.config.effective_agent_id() {
            Some(agent_id) => {
                debug!("Agent completion with {} turns", turns.len());
                let body = AgentRequest { agent_id, messages };
                self.post("/v1/agents/completions", &body).await?
            }
            None => {
                debug!(
                    "Chat completion with {} turns on {}",
                    turns.len(),
                    self.config.model
                );
                let body = ChatRequest {
                    model: &self.config.model,
                    messages,
                    max_tokens: options.max_tokens,
                    temperature: options.temperature,
                };
                self.post("/v1/chat/completions", &body).await?
            }
        };

        response.into_text()
    }

    fn backend(&self) -> BackendInfo {
        BackendInfo {
            model: self.config.model.clone(),
            agent_id: self.config.effective_agent_id().map(str::to_string),
        }
    }
}

#[async_trait]
impl Embedder for MistralClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.config.embed_model,
            input: texts,
        };
        let mut response: EmbeddingResponse = self.post("/v1/embeddings", &body).await?;

        if response.data.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: response.data.len(),
            });
        }

        response.data.sort_by_key(|d| d.index);
        Ok(response
            .data
            .into_iter()
            .map(|d| {
                let mut vector = d.embedding;
                normalize(&mut vector);
                vector
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        &self.config.embed_model
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: String,
    content: &'a str,
}

impl<'a> From<&'a Turn> for WireMessage<'a> {
    fn from(turn: &'a Turn) -> Self {
        Self {
            role: turn.role.to_string(),
            content: &turn.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct AgentRequest<'a> {
    agent_id: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, CompletionError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}
