// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One element of the telephony provider's running transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl TranscriptEntry {
    /// Non-string `content` and `role` values read as absent
    fn from_value(value: &Value) -> Self {
        Self {
            role: value.get("role").and_then(Value::as_str).map(str::to_string),
            content: value
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Accepts any JSON for `transcript`; a malformed tail becomes an empty utterance
fn lenient_transcript<'de, D>(deserializer: D) -> Result<Vec<TranscriptEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().map(TranscriptEntry::from_value).collect())
        .unwrap_or_default())
}

/// Frames sent by the telephony provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// The caller finished speaking and a reply is due
    ResponseRequired {
        #[serde(default, deserialize_with = "lenient_transcript")]
        transcript: Vec<TranscriptEntry>,
    },

    Ping,

    CallEnded,

    /// Any other `type`; ignored
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::ResponseRequired { .. } => "response_required",
            InboundMessage::Ping => "ping",
            InboundMessage::CallEnded => "call_ended",
            InboundMessage::Unknown => "unknown",
        }
    }
}

/// Reply to a `response_required` frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplyEnvelope {
    pub response_id: String,
    pub content: String,
    pub content_complete: bool,
    pub end_call: bool,
}

impl ReplyEnvelope {
    /// A complete, non-terminal reply with a fresh id
    pub fn complete(content: impl Into<String>) -> Self {
        Self {
            response_id: Uuid::new_v4().to_string(),
            content: content.into(),
            content_complete: true,
            end_call: false,
        }
    }
}

/// Transport-level frames the bridge sends on its own
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    Pong,
}
