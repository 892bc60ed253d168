// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Routing of decoded telephony frames

use tracing::{debug, warn};

use super::handler::CallSessionManager;
use super::messages::{ControlMessage, InboundMessage};

/// What the connection loop does after a frame
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Send this text frame back on the same connection
    Reply(String),
    /// Nothing to send
    Ignore,
    /// Stop reading; the call is over
    Terminate,
}

impl CallSessionManager {
    /// Decode one text frame and act on it
    pub async fn dispatch(&self, call_id: &str, frame: &str) -> DispatchOutcome {
        let message = match serde_json::from_str::<InboundMessage>(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!("Ignoring undecodable frame on call {}: {}", call_id, e);
                return DispatchOutcome::Ignore;
            }
        };

        debug!("Call {} received {}", call_id, message.kind());

        match message {
            InboundMessage::ResponseRequired { transcript } => {
                let envelope = self.handle_inbound(call_id, &transcript).await;
                encode(call_id, &envelope)
            }
            InboundMessage::Ping => encode(call_id, &ControlMessage::Pong),
            InboundMessage::CallEnded => {
                self.close(call_id);
                DispatchOutcome::Terminate
            }
            InboundMessage::Unknown => DispatchOutcome::Ignore,
        }
    }
}

fn encode<T: serde::Serialize>(call_id: &str, value: &T) -> DispatchOutcome {
    match serde_json::to_string(value) {
        Ok(text) => DispatchOutcome::Reply(text),
        Err(e) => {
            warn!("Failed to encode reply for call {}: {}", call_id, e);
            DispatchOutcome::Ignore
        }
    }
}
