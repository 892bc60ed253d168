// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bridge server configuration
//!
//! Every value comes from the environment (optionally via `.env`). Provider
//! credentials live in their own subsystem configs and have no defaults.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::api::websocket::HandlerConfig;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    pub completion_timeout: Duration,
    pub voice_max_tokens: u32,
    pub voice_temperature: f32,
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST")
                .ok()
                .filter(|h| !h.is_empty())
                .unwrap_or(defaults.host),
            port: parse_var("PORT").unwrap_or(defaults.port),
            completion_timeout: parse_var("COMPLETION_TIMEOUT_SECS")
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.completion_timeout),
            voice_max_tokens: parse_var("VOICE_MAX_TOKENS")
                .filter(|t: &u32| *t > 0)
                .unwrap_or(defaults.voice_max_tokens),
            voice_temperature: parse_var("VOICE_TEMPERATURE")
                .filter(|t: &f32| t.is_finite())
                .unwrap_or(defaults.voice_temperature),
        }
    }

    /// Socket address to bind; `localhost` resolves to the loopback address
    pub fn listen_addr(&self) -> Result<SocketAddr, std::io::Error> {
        use std::net::ToSocketAddrs;
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    format!("Cannot resolve {}:{}", self.host, self.port),
                )
            })
    }

    pub fn websocket_url(&self) -> String {
        format!("ws://{}:{}/llm-websocket", self.host, self.port)
    }

    pub fn websocket_pattern(&self) -> String {
        format!("ws://{}:{}/call_{{call_id}}", self.host, self.port)
    }

    pub fn handler_config(&self) -> HandlerConfig {
        HandlerConfig {
            completion_timeout: self.completion_timeout,
            max_tokens: self.voice_max_tokens,
            temperature: self.voice_temperature,
            ..HandlerConfig::default()
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8000,
            completion_timeout: Duration::from_secs(20),
            voice_max_tokens: 150,
            voice_temperature: 0.7,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
