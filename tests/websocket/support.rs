// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
#![allow(dead_code)]

use async_trait::async_trait;
use finbot_bridge::api::websocket::{CallSessionManager, HandlerConfig};
use finbot_bridge::api::{serve, AppState};
use finbot_bridge::config::BridgeConfig;
use finbot_bridge::inference::{
    BackendInfo, CompletionClient, CompletionError, CompletionOptions, Role, Turn,
};
use futures_util::StreamExt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Replies with the caller's last utterance echoed back
pub struct EchoCompletion {
    calls: AtomicUsize,
    fail_first: usize,
    last_turns: Mutex<Vec<Turn>>,
}

impl EchoCompletion {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            last_turns: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::failing_first(usize::MAX)
    }

    /// Fails the first `n` calls, then echoes
    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_first: n,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_turns(&self) -> Vec<Turn> {
        self.last_turns.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for EchoCompletion {
    async fn complete(
        &self,
        turns: &[Turn],
        _options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_turns.lock().unwrap() = turns.to_vec();

        if call < self.fail_first {
            return Err(CompletionError::Api {
                status: 500,
                message: "upstream exploded".to_string(),
            });
        }

        let reply = turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| format!("You said: {}", t.content))
            .unwrap_or_else(|| "Hello! How can I help you today?".to_string());
        Ok(reply)
    }

    fn backend(&self) -> BackendInfo {
        BackendInfo {
            model: "echo-model".to_string(),
            agent_id: None,
        }
    }
}

pub fn manager(completion: Arc<dyn CompletionClient>) -> Arc<CallSessionManager> {
    Arc::new(CallSessionManager::new(completion, HandlerConfig::default()))
}

/// Start a bridge on an ephemeral port
pub async fn spawn_bridge(completion: Arc<dyn CompletionClient>) -> (SocketAddr, Arc<CallSessionManager>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let manager = manager(completion);
    let config = BridgeConfig {
        host: "127.0.0.1".to_string(),
        port: addr.port(),
        ..BridgeConfig::default()
    };
    let state = AppState::new(manager.clone(), config);

    tokio::spawn(async move {
        serve(listener, state, std::future::pending()).await.unwrap();
    });

    (addr, manager)
}

pub fn transcript_frame(utterances: &[&str]) -> String {
    let transcript: Vec<serde_json::Value> = utterances
        .iter()
        .map(|u| serde_json::json!({"role": "user", "content": u}))
        .collect();
    serde_json::json!({
        "type": "response_required",
        "response_id": 1,
        "transcript": transcript,
    })
    .to_string()
}

/// Next text frame, skipping control frames
pub async fn next_text(ws: &mut Client) -> String {
    let read = async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return text,
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("websocket error: {}", e),
                None => panic!("stream ended before a text frame"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), read)
        .await
        .expect("timed out waiting for a text frame")
}

/// Poll `condition` until it holds or a few seconds pass
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}
