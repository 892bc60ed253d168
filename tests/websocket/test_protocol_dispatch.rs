// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use finbot_bridge::api::websocket::{DispatchOutcome, ReplyEnvelope};
use std::sync::Arc;

use super::support::{manager, transcript_frame, EchoCompletion};

#[tokio::test]
async fn test_ping_never_mutates_history() {
    let completion = Arc::new(EchoCompletion::new());
    let manager = manager(completion.clone());

    manager
        .dispatch("call-1", &transcript_frame(&["hello"]))
        .await;
    let before = manager.session("call-1").unwrap().turns().to_vec();

    let outcome = manager.dispatch("call-1", r#"{"type":"ping"}"#).await;
    assert_eq!(
        outcome,
        DispatchOutcome::Reply(r#"{"type":"pong"}"#.to_string())
    );

    let after = manager.session("call-1").unwrap().turns().to_vec();
    assert_eq!(before, after);
    assert_eq!(completion.calls(), 1);
}

#[tokio::test]
async fn test_response_required_uses_last_transcript_entry() {
    let completion = Arc::new(EchoCompletion::new());
    let manager = manager(completion.clone());

    let frame = transcript_frame(&["Hi there", "I lost my debit card"]);
    let DispatchOutcome::Reply(text) = manager.dispatch("call-1", &frame).await else {
        panic!("expected a reply frame");
    };

    let envelope: ReplyEnvelope = serde_json::from_str(&text).unwrap();
    assert_eq!(envelope.content, "You said: I lost my debit card");

    let turns = completion.last_turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].content, "I lost my debit card");
}

#[tokio::test]
async fn test_unknown_and_malformed_frames_are_ignored() {
    let completion = Arc::new(EchoCompletion::new());
    let manager = manager(completion.clone());

    for frame in [
        r#"{"type":"update_only","transcript":[]}"#,
        r#"{"type":"reminder_required"}"#,
        "{not json",
        r#"["an","array"]"#,
    ] {
        assert_eq!(
            manager.dispatch("call-1", frame).await,
            DispatchOutcome::Ignore
        );
    }

    assert!(manager.session("call-1").is_none());
    assert_eq!(completion.calls(), 0);
}

#[tokio::test]
async fn test_call_ended_closes_session() {
    let manager = manager(Arc::new(EchoCompletion::new()));
    manager
        .dispatch("call-1", &transcript_frame(&["hello"]))
        .await;
    assert!(manager.session("call-1").is_some());

    let outcome = manager.dispatch("call-1", r#"{"type":"call_ended"}"#).await;
    assert_eq!(outcome, DispatchOutcome::Terminate);
    assert!(manager.session("call-1").is_none());
}

#[tokio::test]
async fn test_response_required_with_bad_entries_always_replies() {
    let completion = Arc::new(EchoCompletion::new());
    let manager = manager(completion.clone());

    for frame in [
        r#"{"type":"response_required","transcript":[{"role":"user","content":null}]}"#,
        r#"{"type":"response_required","transcript":[{"content":42}]}"#,
        r#"{"type":"response_required","transcript":["just a string"]}"#,
        r#"{"type":"response_required","transcript":null}"#,
    ] {
        let DispatchOutcome::Reply(text) = manager.dispatch("call-1", frame).await else {
            panic!("no reply for {}", frame);
        };
        let envelope: ReplyEnvelope = serde_json::from_str(&text).unwrap();
        assert!(!envelope.content.is_empty());
        assert!(envelope.content_complete);
    }

    let session = manager.session("call-1").unwrap();
    assert_eq!(session.turn_count(), 1);
    assert_eq!(completion.calls(), 4);
}

#[tokio::test]
async fn test_null_tail_counts_as_silence() {
    let completion = Arc::new(EchoCompletion::new());
    let manager = manager(completion.clone());

    let frame = r#"{"type":"response_required","transcript":[
        {"role":"user","content":"I lost my card"},
        {"role":"user","content":null}
    ]}"#;
    manager.dispatch("call-1", frame).await;

    assert_eq!(completion.last_turns().len(), 1);
    assert_eq!(manager.session("call-1").unwrap().turn_count(), 1);
}
