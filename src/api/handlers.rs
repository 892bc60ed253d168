// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::ApiError;
use super::http_server::AppState;
use super::websocket::{serve_call, CallGuard};
use crate::inference::{CompletionOptions, Turn};
use crate::version;

/// Message sent by the completion check endpoint
pub const CHECK_MESSAGE: &str = "Hello, can you hear me?";

const CALL_PATH_PREFIX: &str = "call_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub websocket_url: String,
    pub websocket_pattern: String,
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
}

/// Outcome of `/test-mistral`, always served with HTTP 200
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CompletionCheckResponse {
    Success {
        model: String,
        agent_id: Option<String>,
        response: String,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    pub active_connections: usize,
    pub connection_ids: Vec<String>,
}

pub async fn root_handler(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "FinBot voice bridge is running".to_string(),
        websocket_url: state.config.websocket_url(),
        websocket_pattern: state.config.websocket_pattern(),
        status: "healthy".to_string(),
        version: version::VERSION_NUMBER.to_string(),
    })
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn webhook_handler(Json(payload): Json<serde_json::Value>) -> Json<WebhookAck> {
    info!("Received webhook: {}", payload);
    Json(WebhookAck {
        status: "received".to_string(),
    })
}

pub async fn test_completion_handler(State(state): State<AppState>) -> Json<CompletionCheckResponse> {
    let manager = &state.manager;
    let backend = manager.backend();
    let options = CompletionOptions {
        max_tokens: Some(50),
        temperature: None,
    };

    let result = tokio::time::timeout(
        manager.config().completion_timeout,
        manager
            .completion()
            .complete(&[Turn::user(CHECK_MESSAGE)], &options),
    )
    .await;

    let response = match result {
        Ok(Ok(text)) => CompletionCheckResponse::Success {
            model: backend.model,
            agent_id: backend.agent_id,
            response: text,
        },
        Ok(Err(e)) => {
            warn!("Completion check failed: {}", e);
            CompletionCheckResponse::Error {
                error: e.to_string(),
            }
        }
        Err(_) => {
            warn!("Completion check timed out");
            CompletionCheckResponse::Error {
                error: format!(
                    "Completion timed out after {}s",
                    manager.config().completion_timeout.as_secs()
                ),
            }
        }
    };

    Json(response)
}

pub async fn connections_handler(State(state): State<AppState>) -> Json<ConnectionsResponse> {
    let connection_ids = state.manager.registry().connection_ids();
    Json(ConnectionsResponse {
        active_connections: connection_ids.len(),
        connection_ids,
    })
}

/// `/llm-websocket`: the bridge picks the call id
pub async fn llm_websocket_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let call_id = Uuid::new_v4().to_string();
    upgrade_call(ws, call_id, state)
}

/// `/call_{call_id}`: the provider picks the call id
pub async fn call_websocket_handler(
    Path(call_path): Path<String>,
    State(state): State<AppState>,
    ws: Option<WebSocketUpgrade>,
) -> Result<Response, ApiError> {
    let call_id = call_id_from_path(&call_path)
        .ok_or_else(|| ApiError::NotFound(format!("/{}", call_path)))?;

    let ws = ws.ok_or_else(|| {
        ApiError::InvalidRequest("WebSocket upgrade required".to_string())
    })?;

    upgrade_call(ws, call_id.to_string(), state)
}

/// Call id encoded in a `call_{id}` path segment
pub fn call_id_from_path(segment: &str) -> Option<&str> {
    segment
        .strip_prefix(CALL_PATH_PREFIX)
        .filter(|id| !id.is_empty())
}

fn upgrade_call(ws: WebSocketUpgrade, call_id: String, state: AppState) -> Result<Response, ApiError> {
    let guard = CallGuard::claim(state.manager.registry().clone(), call_id)?;
    let manager = state.manager.clone();

    Ok(ws
        .on_upgrade(move |socket| serve_call(socket, guard, manager))
        .into_response())
}
