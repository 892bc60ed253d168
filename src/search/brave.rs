// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Brave web search, the second-choice provider
//!
//! Authenticates with an `X-Subscription-Token` header rather than a query
//! parameter. Only the `web.results` section of the response is read; news,
//! video and discussion blocks are ignored.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

use super::provider::{decode_response, transport_error, SearchProvider};
use super::types::{source_domain, SearchError, SearchResult};

const ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";
const TOKEN_HEADER: &str = "X-Subscription-Token";
const MAX_COUNT: usize = 20;

/// `count` query value, clamped to what the API accepts
fn count_param(num_results: usize) -> String {
    num_results.clamp(1, MAX_COUNT).to_string()
}

pub struct BraveSearchProvider {
    token: String,
    http: Client,
    timeout_ms: u64,
}

impl BraveSearchProvider {
    pub fn new(api_key: String, timeout_ms: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            token: api_key,
            http,
            timeout_ms,
        }
    }

    fn request(&self, query: &str, num_results: usize) -> RequestBuilder {
        self.http
            .get(ENDPOINT)
            .header(TOKEN_HEADER, &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("q", query.to_string()), ("count", count_param(num_results))])
    }
}

#[async_trait]
impl SearchProvider for BraveSearchProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .request(query, num_results)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_ms))?;

        let page: WebSearchPage = decode_response(self.name(), response).await?;
        Ok(page.hits().map(WebHit::into_result).collect())
    }

    fn name(&self) -> &'static str {
        "brave"
    }

    fn is_available(&self) -> bool {
        !self.token.is_empty()
    }

    fn priority(&self) -> u8 {
        20
    }
}

#[derive(Debug, Default, Deserialize)]
struct WebSearchPage {
    #[serde(default)]
    web: Option<WebSection>,
}

#[derive(Debug, Default, Deserialize)]
struct WebSection {
    #[serde(default)]
    results: Vec<WebHit>,
}

#[derive(Debug, Deserialize)]
struct WebHit {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    /// Relative freshness such as "3 days ago"
    age: Option<String>,
}

impl WebSearchPage {
    fn hits(self) -> impl Iterator<Item = WebHit> {
        self.web.unwrap_or_default().results.into_iter()
    }
}

impl WebHit {
    fn into_result(self) -> SearchResult {
        SearchResult {
            source: source_domain(&self.url),
            title: self.title,
            url: self.url,
            snippet: self.description,
            published_date: self.age,
        }
    }
}
