// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Grounded question answering over the knowledge base
//!
//! Flow per question: embed, retrieve top-k local passages, run the quality
//! gate, search the web when the gate asks for it, assemble a numbered
//! context and make a single completion request.
//!
//! Retrieval and web search never fail a question on their own; their errors
//! are logged and treated as "no results". Only an empty question, an empty
//! context or a completion error reach the caller.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::RagConfig;
use super::context::{assemble, Context};
use super::errors::RagError;
use super::gate::{gate, GateDecision};
use super::knowledge_base::KnowledgeBase;
use super::types::Passage;
use crate::embeddings::Embedder;
use crate::inference::{CompletionClient, CompletionOptions, Turn};
use crate::search::SearchService;

pub const QA_SYSTEM_INSTRUCTION: &str = "You are a concise QA assistant. \
Answer **only** from the context below; if the answer is not contained, say you don't know. \
Cite passage numbers in square brackets.";

/// Per-question overrides of the pipeline configuration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AskOptions {
    pub k: Option<usize>,
    pub temperature: Option<f32>,
    pub threshold: Option<f32>,
}

/// A grounded answer and the evidence behind it
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub answer: String,
    pub context: Context,
    pub decision: GateDecision,
}

pub struct RagPipeline {
    knowledge: Option<KnowledgeBase>,
    embedder: Arc<dyn Embedder>,
    completion: Arc<dyn CompletionClient>,
    web: Option<Arc<SearchService>>,
    config: RagConfig,
}

impl RagPipeline {
    /// `knowledge` of `None` runs the pipeline in degraded mode
    pub fn new(
        knowledge: Option<KnowledgeBase>,
        embedder: Arc<dyn Embedder>,
        completion: Arc<dyn CompletionClient>,
        config: RagConfig,
    ) -> Self {
        Self {
            knowledge,
            embedder,
            completion,
            web: None,
            config,
        }
    }

    /// Load the knowledge base from the configured paths
    ///
    /// A missing or unreadable index is logged once and the pipeline starts
    /// degraded instead of failing.
    pub fn load(
        config: RagConfig,
        embedder: Arc<dyn Embedder>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        let loaded = KnowledgeBase::load(&config.index_path, &config.docs_path)
            .and_then(|kb| kb.check_embedder(embedder.model_name()).map(|()| kb));
        let knowledge = match loaded {
            Ok(kb) => Some(kb),
            Err(e) => {
                warn!(
                    code = e.error_code(),
                    "Knowledge base unavailable, retrieval disabled: {}", e
                );
                None
            }
        };
        Self::new(knowledge, embedder, completion, config)
    }

    pub fn with_web_search(mut self, web: Arc<SearchService>) -> Self {
        self.web = Some(web);
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.knowledge.is_none()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Top-k local passages, empty on any failure
    pub async fn retrieve(&self, question: &str, k: usize) -> Vec<Passage> {
        let Some(knowledge) = self.knowledge.as_ref() else {
            return Vec::new();
        };

        let vectors = match self.embedder.embed(&[question.to_string()]).await {
            Ok(vectors) => vectors,
            Err(e) => {
                warn!("Query embedding failed: {}", e);
                return Vec::new();
            }
        };

        let Some(query) = vectors.into_iter().next() else {
            warn!("Embedder returned no vector for the query");
            return Vec::new();
        };

        match knowledge.search(&query, k) {
            Ok(passages) => passages,
            Err(e) => {
                warn!(code = e.error_code(), "Knowledge base search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Web passages for the question, empty when search is off or fails
    pub async fn web_passages(&self, question: &str) -> Vec<Passage> {
        let Some(web) = self.web.as_ref() else {
            return Vec::new();
        };

        match web.search(question, Some(self.config.web_results)).await {
            Ok(response) => {
                debug!(
                    "Web search returned {} results from {} (cached: {})",
                    response.results.len(),
                    response.provider,
                    response.cached
                );
                response.results.into_iter().map(Passage::from).collect()
            }
            Err(e) => {
                warn!("Web search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Answer `question` from retrieved evidence
    pub async fn answer(
        &self,
        question: &str,
        options: &AskOptions,
    ) -> Result<RagAnswer, RagError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::EmptyQuestion);
        }

        let k = options.k.unwrap_or(self.config.top_k);
        let threshold = options.threshold.unwrap_or(self.config.quality_threshold);

        let local = self.retrieve(question, k).await;
        let decision = gate(&local, threshold);

        let web = if decision.use_web {
            info!(
                "Local retrieval insufficient (best={:?}, threshold={}), searching the web",
                decision.best_score, threshold
            );
            self.web_passages(question).await
        } else {
            Vec::new()
        };

        let context = assemble(local, web)?;
        let turns = qa_turns(&context, question);
        let completion_options = CompletionOptions {
            max_tokens: None,
            temperature: Some(options.temperature.unwrap_or(self.config.temperature)),
        };

        let answer = self.completion.complete(&turns, &completion_options).await?;

        info!(
            "Answered with {} passages ({})",
            context.len(),
            context.provenance
        );

        Ok(RagAnswer {
            answer,
            context,
            decision,
        })
    }
}

/// System instruction plus the context-bearing user prompt
pub fn qa_turns(context: &Context, question: &str) -> Vec<Turn> {
    vec![
        Turn::system(QA_SYSTEM_INSTRUCTION),
        Turn::user(format!(
            "Context:\n{}\n\nQuestion: {}",
            context.render(),
            question
        )),
    ]
}
