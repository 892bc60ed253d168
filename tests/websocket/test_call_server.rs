// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use finbot_bridge::api::websocket::ReplyEnvelope;
use futures_util::SinkExt;
use std::sync::Arc;
use tokio_tungstenite::{connect_async, tungstenite, tungstenite::Message};

use super::support::{next_text, spawn_bridge, transcript_frame, wait_until, EchoCompletion};

#[tokio::test]
async fn test_call_round_trip() {
    let completion = Arc::new(EchoCompletion::new());
    let (addr, manager) = spawn_bridge(completion.clone()).await;

    let (mut ws, _) = connect_async(format!("ws://{}/call_abc", addr))
        .await
        .unwrap();

    ws.send(Message::Text(transcript_frame(&["I lost my debit card"])))
        .await
        .unwrap();
    let reply: ReplyEnvelope = serde_json::from_str(&next_text(&mut ws).await).unwrap();

    assert_eq!(reply.content, "You said: I lost my debit card");
    assert!(reply.content_complete);
    assert!(!reply.end_call);
    assert!(manager.registry().is_connected("abc"));
    assert_eq!(manager.session("abc").unwrap().turn_count(), 3);

    ws.close(None).await.unwrap();
    assert!(wait_until(|| !manager.registry().is_connected("abc")).await);
    assert!(manager.session("abc").is_none());
}

#[tokio::test]
async fn test_each_reply_has_its_own_response_id() {
    let (addr, _manager) = spawn_bridge(Arc::new(EchoCompletion::new())).await;
    let (mut ws, _) = connect_async(format!("ws://{}/call_ids", addr))
        .await
        .unwrap();

    ws.send(Message::Text(transcript_frame(&["one"]))).await.unwrap();
    let first: ReplyEnvelope = serde_json::from_str(&next_text(&mut ws).await).unwrap();
    ws.send(Message::Text(transcript_frame(&["one", "two"])))
        .await
        .unwrap();
    let second: ReplyEnvelope = serde_json::from_str(&next_text(&mut ws).await).unwrap();

    assert_ne!(first.response_id, second.response_id);
    assert_eq!(second.content, "You said: two");
}

#[tokio::test]
async fn test_ping_frame_gets_pong() {
    let completion = Arc::new(EchoCompletion::new());
    let (addr, _manager) = spawn_bridge(completion.clone()).await;
    let (mut ws, _) = connect_async(format!("ws://{}/call_ping", addr))
        .await
        .unwrap();

    ws.send(Message::Text(r#"{"type":"ping"}"#.to_string()))
        .await
        .unwrap();
    let pong: serde_json::Value = serde_json::from_str(&next_text(&mut ws).await).unwrap();

    assert_eq!(pong, serde_json::json!({"type": "pong"}));
    assert_eq!(completion.calls(), 0);
}

#[tokio::test]
async fn test_call_ended_then_reconnect_is_fresh() {
    let (addr, manager) = spawn_bridge(Arc::new(EchoCompletion::new())).await;
    let url = format!("ws://{}/call_again", addr);

    let (mut ws, _) = connect_async(&url).await.unwrap();
    ws.send(Message::Text(transcript_frame(&["first"]))).await.unwrap();
    next_text(&mut ws).await;
    ws.send(Message::Text(r#"{"type":"call_ended"}"#.to_string()))
        .await
        .unwrap();

    assert!(wait_until(|| !manager.registry().is_connected("again")).await);
    assert!(manager.session("again").is_none());

    let (mut ws, _) = connect_async(&url).await.unwrap();
    ws.send(Message::Text(transcript_frame(&["second"]))).await.unwrap();
    next_text(&mut ws).await;

    let session = manager.session("again").unwrap();
    assert_eq!(session.turn_count(), 3);
    assert_eq!(session.turns()[1].content, "second");
}

#[tokio::test]
async fn test_duplicate_call_id_is_rejected() {
    let (addr, manager) = spawn_bridge(Arc::new(EchoCompletion::new())).await;
    let url = format!("ws://{}/call_dup", addr);

    let (_first, _) = connect_async(&url).await.unwrap();
    assert!(wait_until(|| manager.registry().is_connected("dup")).await);

    match connect_async(&url).await {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 409),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("second connection for the same call id was accepted"),
    }
    assert_eq!(manager.registry().connection_count(), 1);
}

#[tokio::test]
async fn test_abrupt_disconnect_cleans_up() {
    let (addr, manager) = spawn_bridge(Arc::new(EchoCompletion::new())).await;

    let (mut ws, _) = connect_async(format!("ws://{}/call_gone", addr))
        .await
        .unwrap();
    ws.send(Message::Text(transcript_frame(&["hello"]))).await.unwrap();
    next_text(&mut ws).await;
    drop(ws);

    assert!(wait_until(|| !manager.registry().is_connected("gone")).await);
    assert!(manager.session("gone").is_none());
}

#[tokio::test]
async fn test_llm_websocket_assigns_call_id() {
    let (addr, manager) = spawn_bridge(Arc::new(EchoCompletion::new())).await;

    let (mut ws, _) = connect_async(format!("ws://{}/llm-websocket", addr))
        .await
        .unwrap();
    ws.send(Message::Text(transcript_frame(&["hello"]))).await.unwrap();
    let reply: ReplyEnvelope = serde_json::from_str(&next_text(&mut ws).await).unwrap();
    assert_eq!(reply.content, "You said: hello");

    let ids = manager.registry().connection_ids();
    assert_eq!(ids.len(), 1);
    assert!(uuid::Uuid::parse_str(&ids[0]).is_ok());
}
