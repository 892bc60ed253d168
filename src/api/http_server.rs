// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    call_websocket_handler, connections_handler, health_handler, llm_websocket_handler,
    root_handler, test_completion_handler, webhook_handler,
};
use super::websocket::CallSessionManager;
use crate::config::BridgeConfig;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<CallSessionManager>,
    pub config: Arc<BridgeConfig>,
}

impl AppState {
    pub fn new(manager: Arc<CallSessionManager>, config: BridgeConfig) -> Self {
        Self {
            manager,
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/webhook", post(webhook_handler))
        .route("/test-mistral", post(test_completion_handler))
        .route("/connections", get(connections_handler))
        .route("/llm-websocket", get(llm_websocket_handler))
        .route("/:call_path", get(call_websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Bridge listening on http://{}", listener.local_addr()?);
    tracing::info!("WebSocket endpoints:");
    tracing::info!("   - {}", state.config.websocket_url());
    tracing::info!("   - {}", state.config.websocket_pattern());

    serve(listener, state, async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        }
    })
    .await
}
