// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::inference::{Role, Turn};

/// Instruction placed at the head of every voice conversation
pub const VOICE_SYSTEM_PROMPT: &str = "You are a helpful AI assistant in a voice conversation. \
Keep your responses conversational, concise, and natural for speech. \
Avoid using markdown or special formatting.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub total_turns: usize,
    pub user_turns: usize,
    pub assistant_turns: usize,
    pub completion_failures: usize,
}

/// Conversation state of one live call
#[derive(Debug, Clone)]
pub struct CallSession {
    call_id: String,
    turns: Vec<Turn>,
    metrics: SessionMetrics,
    created_at: Instant,
    last_activity: Instant,
}

impl CallSession {
    pub fn new(call_id: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            call_id: call_id.into(),
            turns: Vec::new(),
            metrics: SessionMetrics::default(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Insert the system prompt at the head if no system turn exists yet
    ///
    /// Returns whether a turn was inserted.
    pub fn ensure_system_prompt(&mut self, prompt: &str) -> bool {
        if self.turns.iter().any(|t| t.role == Role::System) {
            return false;
        }
        self.turns.insert(0, Turn::system(prompt));
        self.metrics.total_turns += 1;
        true
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Turn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Turn::assistant(content));
    }

    /// Whether the latest turn is a user turn still waiting for its answer
    pub fn awaiting_reply(&self) -> bool {
        self.turns.last().map(|t| t.role) == Some(Role::User)
    }

    /// Count a failed completion and answer the pending user turn with `fallback`
    pub fn record_failure(&mut self, fallback: &str) {
        self.metrics.completion_failures += 1;
        if self.awaiting_reply() {
            self.push_assistant(fallback);
        }
        self.last_activity = Instant::now();
    }

    fn push(&mut self, turn: Turn) {
        match turn.role {
            Role::User => self.metrics.user_turns += 1,
            Role::Assistant => self.metrics.assistant_turns += 1,
            Role::System => {}
        }
        self.metrics.total_turns += 1;
        self.turns.push(turn);
        self.last_activity = Instant::now();
    }
}
