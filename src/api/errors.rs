// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::websocket::AlreadyConnected;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    /// A second connection for a call id that is already live
    Conflict { call_id: String },
    ServiceUnavailable(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::Conflict { call_id } => {
                let mut details = HashMap::new();
                details.insert(
                    "call_id".to_string(),
                    serde_json::Value::String(call_id.clone()),
                );
                (
                    "conflict",
                    format!("Call {} is already connected", call_id),
                    Some(details),
                )
            }
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            request_id,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_) => 400,
            ApiError::Conflict { .. } => 409,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Conflict { call_id } => write!(f, "Call {} is already connected", call_id),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AlreadyConnected> for ApiError {
    fn from(err: AlreadyConnected) -> Self {
        ApiError::Conflict { call_id: err.0 }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = self.to_response(None);

        (status, axum::response::Json(body)).into_response()
    }
}
