// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod websocket;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{
    CompletionCheckResponse, ConnectionsResponse, HealthResponse, RootResponse, WebhookAck,
    CHECK_MESSAGE,
};
pub use http_server::{create_router, serve, start_server, AppState};
