// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-call WebSocket loop and its cleanup guard

use axum::extract::ws::{Message, WebSocket};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::dispatch::DispatchOutcome;
use super::handler::CallSessionManager;
use super::session_store::{AlreadyConnected, SessionRegistry};

/// Holds a call id's connection slot
///
/// Dropping the guard removes both the session and the connection entry,
/// whether the loop ended normally, the peer vanished, the upgrade never
/// completed or the task was cancelled.
pub struct CallGuard {
    call_id: String,
    registry: Arc<SessionRegistry>,
}

impl CallGuard {
    /// Register a live connection for `call_id`
    pub fn claim(
        registry: Arc<SessionRegistry>,
        call_id: impl Into<String>,
    ) -> Result<Self, AlreadyConnected> {
        let call_id = call_id.into();
        registry.register_connection(&call_id)?;
        Ok(Self { call_id, registry })
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.registry.release(&self.call_id);
        info!("Call {} cleaned up", self.call_id);
    }
}

/// Serve one call until it ends
pub async fn serve_call(mut socket: WebSocket, guard: CallGuard, manager: Arc<CallSessionManager>) {
    let call_id = guard.call_id().to_string();
    manager.open(&call_id);
    info!("Call {} connected", call_id);

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => match manager.dispatch(&call_id, &text).await {
                DispatchOutcome::Reply(reply) => {
                    if let Err(e) = socket.send(Message::Text(reply)).await {
                        warn!("Send failed on call {}: {}", call_id, e);
                        break;
                    }
                }
                DispatchOutcome::Ignore => {}
                DispatchOutcome::Terminate => {
                    info!("Call {} ended by provider", call_id);
                    break;
                }
            },
            Ok(Message::Ping(data)) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("Call {} closed by peer", call_id);
                break;
            }
            Ok(other) => {
                debug!("Ignoring non-text frame on call {}: {:?}", call_id, other);
            }
            Err(e) => {
                warn!("WebSocket error on call {}: {}", call_id, e);
                break;
            }
        }
    }

    drop(guard);
}
