// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search service orchestration
//!
//! Coordinates search providers, caching, and rate limiting.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::brave::BraveSearchProvider;
use super::cache::SearchCache;
use super::config::SearchConfig;
use super::provider::SearchProvider;
use super::rate_limiter::SearchRateLimiter;
use super::serpapi::{SerpApiProvider, SerpLocale};
use super::types::{SearchError, SearchResponse};

const CACHE_CAPACITY: usize = 1000;

/// Orchestrates providers, caching, and rate limiting
pub struct SearchService {
    providers: Vec<Box<dyn SearchProvider>>,
    cache: SearchCache,
    rate_limiter: SearchRateLimiter,
    config: SearchConfig,
}

impl SearchService {
    /// Build the provider chain from configured credentials
    pub fn new(config: SearchConfig) -> Self {
        let mut providers: Vec<Box<dyn SearchProvider>> = Vec::new();

        if let Some(ref api_key) = config.providers.serpapi_api_key {
            providers.push(Box::new(SerpApiProvider::new(
                api_key.clone(),
                SerpLocale::from(&config.providers),
                config.request_timeout_ms,
            )));
            debug!("SerpAPI provider enabled");
        }

        if let Some(ref api_key) = config.providers.brave_api_key {
            providers.push(Box::new(BraveSearchProvider::new(
                api_key.clone(),
                config.request_timeout_ms,
            )));
            debug!("Brave Search provider enabled");
        }

        if providers.is_empty() {
            warn!("No search provider has an API key, web fallback will be unavailable");
        }

        Self::with_providers(config, providers)
    }

    /// Use an explicit provider list
    pub fn with_providers(config: SearchConfig, mut providers: Vec<Box<dyn SearchProvider>>) -> Self {
        providers.sort_by_key(|p| p.priority());

        let cache = SearchCache::new(Duration::from_secs(config.cache_ttl_secs), CACHE_CAPACITY);
        let rate_limiter = SearchRateLimiter::new(config.rate_limit_per_minute);

        Self {
            providers,
            cache,
            rate_limiter,
            config,
        }
    }

    /// Search with cache, rate limit and provider fallthrough
    ///
    /// `num_results` of `None` uses the configured default.
    pub async fn search(
        &self,
        query: &str,
        num_results: Option<usize>,
    ) -> Result<SearchResponse, SearchError> {
        if !self.config.enabled {
            return Err(SearchError::SearchDisabled);
        }

        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery {
                reason: "query is empty".to_string(),
            });
        }

        let num_results = num_results.unwrap_or(self.config.default_num_results);

        if let Some(hit) = self.cache.get(query, num_results) {
            debug!("Cache hit for query: {}", query);
            return Ok(SearchResponse {
                query: query.to_string(),
                results: hit.results,
                search_time_ms: 0,
                provider: hit.provider.to_string(),
                cached: true,
            });
        }

        self.rate_limiter.check()?;

        let start = Instant::now();

        for provider in &self.providers {
            if !provider.is_available() {
                continue;
            }

            debug!("Trying search provider: {}", provider.name());

            match provider.search(query, num_results).await {
                Ok(results) => {
                    let elapsed_ms = start.elapsed().as_millis() as u64;

                    self.cache
                        .insert(query, num_results, &results, provider.name());

                    info!(
                        "Search complete: {} results from {} in {}ms",
                        results.len(),
                        provider.name(),
                        elapsed_ms
                    );

                    return Ok(SearchResponse {
                        query: query.to_string(),
                        results,
                        search_time_ms: elapsed_ms,
                        provider: provider.name().to_string(),
                        cached: false,
                    });
                }
                Err(e) => {
                    warn!(
                        "Search provider {} failed: {}, trying next",
                        provider.name(),
                        e
                    );
                }
            }
        }

        Err(SearchError::ProviderUnavailable {
            provider: "all".to_string(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enabled and at least one provider can be tried
    pub fn is_usable(&self) -> bool {
        self.config.enabled && self.providers.iter().any(|p| p.is_available())
    }

    /// Names of providers with credentials, in try order
    pub fn available_providers(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.name())
            .collect()
    }

    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
