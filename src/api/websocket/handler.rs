// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Call session manager
//!
//! Owns per-call conversation state and drives exactly one completion per
//! `response_required` frame. Failures never leave this boundary: the caller
//! always gets a reply envelope, the fixed apology when anything went wrong.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::messages::{ReplyEnvelope, TranscriptEntry};
use super::session::{CallSession, VOICE_SYSTEM_PROMPT};
use super::session_store::SessionRegistry;
use crate::inference::{BackendInfo, CompletionClient, CompletionError, CompletionOptions};

pub const FALLBACK_REPLY: &str =
    "I apologize, but I'm having trouble processing your request right now.";

#[derive(Debug, Clone)]
pub struct HandlerConfig {
    pub completion_timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            completion_timeout: Duration::from_secs(20),
            max_tokens: 150,
            temperature: 0.7,
            system_prompt: VOICE_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("Completion timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The call was closed while a reply was being produced
    #[error("No session for call {0}")]
    SessionMissing(String),
}

pub struct CallSessionManager {
    registry: Arc<SessionRegistry>,
    completion: Arc<dyn CompletionClient>,
    config: HandlerConfig,
}

impl CallSessionManager {
    pub fn new(completion: Arc<dyn CompletionClient>, config: HandlerConfig) -> Self {
        Self::with_registry(Arc::new(SessionRegistry::new()), completion, config)
    }

    pub fn with_registry(
        registry: Arc<SessionRegistry>,
        completion: Arc<dyn CompletionClient>,
        config: HandlerConfig,
    ) -> Self {
        Self {
            registry,
            completion,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn backend(&self) -> BackendInfo {
        self.completion.backend()
    }

    pub fn completion(&self) -> &Arc<dyn CompletionClient> {
        &self.completion
    }

    /// Create an empty session for `call_id` unless one exists
    pub fn open(&self, call_id: &str) {
        if self.registry.open_session(call_id) {
            debug!("Session opened for call {}", call_id);
        }
    }

    /// Delete the session. Returns whether one existed.
    pub fn close(&self, call_id: &str) -> bool {
        let removed = self.registry.remove_session(call_id);
        if removed {
            info!("Session closed for call {}", call_id);
        }
        removed
    }

    pub fn session(&self, call_id: &str) -> Option<CallSession> {
        self.registry.session_snapshot(call_id)
    }

    /// Produce the reply to the latest caller utterance
    pub async fn handle_inbound(
        &self,
        call_id: &str,
        transcript: &[TranscriptEntry],
    ) -> ReplyEnvelope {
        match self.generate_reply(call_id, transcript).await {
            Ok(content) => {
                info!("Reply for call {}: {} chars", call_id, content.len());
                ReplyEnvelope::complete(content)
            }
            Err(e) => {
                warn!("Reply generation failed for call {}: {}", call_id, e);
                self.registry
                    .with_session_mut(call_id, |session| session.record_failure(FALLBACK_REPLY));
                ReplyEnvelope::complete(FALLBACK_REPLY)
            }
        }
    }

    async fn generate_reply(
        &self,
        call_id: &str,
        transcript: &[TranscriptEntry],
    ) -> Result<String, SessionError> {
        self.open(call_id);

        let utterance = transcript
            .last()
            .map(|entry| entry.content.trim())
            .filter(|content| !content.is_empty());

        let turns = self
            .registry
            .with_session_mut(call_id, |session| {
                session.ensure_system_prompt(&self.config.system_prompt);
                if let Some(content) = utterance {
                    session.push_user(content);
                }
                session.turns().to_vec()
            })
            .ok_or_else(|| SessionError::SessionMissing(call_id.to_string()))?;

        debug!("Requesting completion for call {} over {} turns", call_id, turns.len());

        let options = CompletionOptions::voice(self.config.max_tokens, self.config.temperature);
        let content = tokio::time::timeout(
            self.config.completion_timeout,
            self.completion.complete(&turns, &options),
        )
        .await
        .map_err(|_| SessionError::Timeout {
            timeout_ms: self.config.completion_timeout.as_millis() as u64,
        })??;

        // A reply to an empty transcript has no user turn to pair with and
        // stays out of the history.
        self.registry
            .with_session_mut(call_id, |session| {
                if session.awaiting_reply() {
                    session.push_assistant(content.as_str());
                }
            })
            .ok_or_else(|| SessionError::SessionMissing(call_id.to_string()))?;

        Ok(content)
    }
}
