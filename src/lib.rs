// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod inference;
pub mod rag;
pub mod search;
pub mod version;

pub use api::websocket::{CallSessionManager, HandlerConfig, ReplyEnvelope, SessionRegistry};
pub use config::BridgeConfig;
pub use inference::{CompletionClient, CompletionError, CompletionOptions, Role, Turn};
pub use rag::{gate, GateDecision, Passage, RagPipeline, RetrievalGate};
