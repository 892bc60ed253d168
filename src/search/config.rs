// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the web search fallback

use std::env;

/// Configuration for web search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub enabled: bool,
    pub providers: SearchProviderConfig,
    pub cache_ttl_secs: u64,
    pub rate_limit_per_minute: u32,
    /// Results requested per search
    pub default_num_results: usize,
    pub request_timeout_ms: u64,
}

/// Provider credentials and locale
#[derive(Debug, Clone)]
pub struct SearchProviderConfig {
    pub serpapi_api_key: Option<String>,
    pub brave_api_key: Option<String>,
    pub location: String,
    pub language: String,
    pub country: String,
}

impl SearchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env::var("WEB_SEARCH_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
            providers: SearchProviderConfig {
                serpapi_api_key: env::var("SERPAPI_API_KEY").ok().filter(|k| !k.is_empty()),
                brave_api_key: env::var("BRAVE_API_KEY").ok().filter(|k| !k.is_empty()),
                location: env::var("SEARCH_LOCATION").unwrap_or(defaults.providers.location),
                language: env::var("SEARCH_LANGUAGE").unwrap_or(defaults.providers.language),
                country: env::var("SEARCH_COUNTRY").unwrap_or(defaults.providers.country),
            },
            cache_ttl_secs: env::var("SEARCH_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
            rate_limit_per_minute: env::var("SEARCH_RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_per_minute),
            default_num_results: defaults.default_num_results,
            request_timeout_ms: defaults.request_timeout_ms,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl_secs == 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }
        if self.rate_limit_per_minute == 0 {
            return Err("Rate limit must be greater than 0".to_string());
        }
        if self.default_num_results == 0 {
            return Err("Result count must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Whether any provider has a credential
    pub fn has_any_provider(&self) -> bool {
        self.providers.serpapi_api_key.is_some() || self.providers.brave_api_key.is_some()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            providers: SearchProviderConfig {
                serpapi_api_key: None,
                brave_api_key: None,
                location: "United States".to_string(),
                language: "en".to_string(),
                country: "us".to_string(),
            },
            cache_ttl_secs: 3600,
            rate_limit_per_minute: 60,
            default_num_results: 5,
            request_timeout_ms: 10000,
        }
    }
}
