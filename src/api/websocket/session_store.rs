// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide registries of live connections and call sessions
//!
//! Both maps are keyed by call id and guarded by `std::sync::RwLock`; no lock
//! is held across an `.await`. A poisoned lock is recovered, not propagated.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

use super::session::CallSession;

/// Bookkeeping for an accepted WebSocket
#[derive(Debug, Clone)]
pub struct ConnectionEntry {
    pub connected_at: Instant,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Call {0} already has a live connection")]
pub struct AlreadyConnected(pub String);

#[derive(Default)]
pub struct SessionRegistry {
    connections: RwLock<HashMap<String, ConnectionEntry>>,
    sessions: RwLock<HashMap<String, CallSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the call id for a new connection
    pub fn register_connection(&self, call_id: &str) -> Result<(), AlreadyConnected> {
        let mut connections = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if connections.contains_key(call_id) {
            return Err(AlreadyConnected(call_id.to_string()));
        }

        connections.insert(
            call_id.to_string(),
            ConnectionEntry {
                connected_at: Instant::now(),
            },
        );
        Ok(())
    }

    pub fn remove_connection(&self, call_id: &str) -> bool {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(call_id)
            .is_some()
    }

    pub fn is_connected(&self, call_id: &str) -> bool {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(call_id)
    }

    /// Live call ids, sorted
    pub fn connection_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn connection_count(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Create an empty session if none exists. Returns whether one was created.
    pub fn open_session(&self, call_id: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(call_id) {
            return false;
        }
        sessions.insert(call_id.to_string(), CallSession::new(call_id));
        true
    }

    pub fn remove_session(&self, call_id: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(call_id)
            .is_some()
    }

    pub fn has_session(&self, call_id: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(call_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Run `f` against the session under the write lock
    ///
    /// `None` if the session does not exist. `f` must not block.
    pub fn with_session_mut<R>(
        &self,
        call_id: &str,
        f: impl FnOnce(&mut CallSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.get_mut(call_id).map(f)
    }

    pub fn session_snapshot(&self, call_id: &str) -> Option<CallSession> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(call_id)
            .cloned()
    }

    /// Drop both the session and the connection entry for `call_id`
    pub fn release(&self, call_id: &str) {
        self.remove_session(call_id);
        self.remove_connection(call_id);
    }
}
