// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! SerpAPI (Google engine) provider

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::config::SearchProviderConfig;
use super::provider::{decode_response, transport_error, SearchProvider};
use super::types::{source_domain, SearchError, SearchResult};

const SERPAPI_URL: &str = "https://serpapi.com/search";

/// Locale parameters forwarded on every request
#[derive(Debug, Clone)]
pub struct SerpLocale {
    pub location: String,
    pub language: String,
    pub country: String,
}

impl From<&SearchProviderConfig> for SerpLocale {
    fn from(config: &SearchProviderConfig) -> Self {
        Self {
            location: config.location.clone(),
            language: config.language.clone(),
            country: config.country.clone(),
        }
    }
}

pub struct SerpApiProvider {
    api_key: String,
    locale: SerpLocale,
    client: Client,
    timeout_ms: u64,
}

impl SerpApiProvider {
    pub fn new(api_key: String, locale: SerpLocale, timeout_ms: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            locale,
            client,
            timeout_ms,
        }
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let num = num_results.to_string();
        let response = self
            .client
            .get(SERPAPI_URL)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("num", num.as_str()),
                ("hl", self.locale.language.as_str()),
                ("gl", self.locale.country.as_str()),
                ("location", self.locale.location.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_ms))?;

        let data: SerpResponse = decode_response(self.name(), response).await?;
        Ok(data.into_results(num_results))
    }

    fn name(&self) -> &'static str {
        "serpapi"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn priority(&self) -> u8 {
        10
    }
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<SerpOrganicResult>,
}

#[derive(Debug, Deserialize)]
struct SerpOrganicResult {
    title: Option<String>,
    snippet: Option<String>,
    description: Option<String>,
    link: Option<String>,
    url: Option<String>,
    date: Option<String>,
}

impl SerpResponse {
    fn into_results(self, limit: usize) -> Vec<SearchResult> {
        self.organic_results
            .into_iter()
            .take(limit)
            .map(|r| {
                let link = r.link.or(r.url).unwrap_or_default();
                SearchResult {
                    title: r.title.unwrap_or_else(|| "No title".to_string()),
                    snippet: r
                        .snippet
                        .or(r.description)
                        .unwrap_or_else(|| "No description available".to_string()),
                    source: source_domain(&link),
                    url: if link.is_empty() { "#".to_string() } else { link },
                    published_date: r.date,
                }
            })
            .collect()
    }
}
