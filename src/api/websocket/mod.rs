// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod connection;
pub mod dispatch;
pub mod handler;
pub mod messages;
pub mod session;
pub mod session_store;

pub use connection::{serve_call, CallGuard};
pub use dispatch::DispatchOutcome;
pub use handler::{CallSessionManager, HandlerConfig, SessionError, FALLBACK_REPLY};
pub use messages::{ControlMessage, InboundMessage, ReplyEnvelope, TranscriptEntry};
pub use session::{CallSession, SessionMetrics, VOICE_SYSTEM_PROMPT};
pub use session_store::{AlreadyConnected, SessionRegistry};
