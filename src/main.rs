// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use finbot_bridge::{
    api::{start_server, websocket::CallSessionManager, AppState},
    config::BridgeConfig,
    inference::{MistralClient, MistralConfig},
    version,
};
use std::{env, sync::Arc};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting FinBot voice bridge...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let bridge_config = BridgeConfig::from_env();
    let mistral_config = MistralConfig::from_env();

    if !mistral_config.has_api_key() {
        warn!("MISTRAL_API_KEY is not set; every reply will be the fallback apology");
    }
    info!("🤖 Mistral model: {}", mistral_config.model);
    match mistral_config.effective_agent_id() {
        Some(agent_id) => info!("🎯 Agent ID: {}", agent_id),
        None => info!("🎯 No agent configured, using chat completions"),
    }

    let completion = Arc::new(MistralClient::new(mistral_config));
    let manager = Arc::new(CallSessionManager::new(
        completion,
        bridge_config.handler_config(),
    ));

    start_server(AppState::new(manager, bridge_config)).await?;

    info!("Bridge stopped");
    Ok(())
}
