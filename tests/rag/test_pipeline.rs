// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use finbot_bridge::embeddings::{Embedder, HashEmbedder};
use finbot_bridge::inference::{
    BackendInfo, CompletionClient, CompletionError, CompletionOptions, Turn,
};
use finbot_bridge::rag::{
    AskOptions, DocumentChunk, KnowledgeBase, Provenance, RagConfig, RagError, RagPipeline,
    QA_SYSTEM_INSTRUCTION,
};
use finbot_bridge::search::{SearchConfig, SearchError, SearchProvider, SearchResult, SearchService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const CARD_POLICY: &str = "Report a lost debit card within 24 hours to avoid liability.";

struct RecordingCompletion {
    prompts: Mutex<Vec<Vec<Turn>>>,
}

impl RecordingCompletion {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn last_prompt(&self) -> Vec<Turn> {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for RecordingCompletion {
    async fn complete(
        &self,
        turns: &[Turn],
        _options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(turns.to_vec());
        Ok("Call the helpline within 24 hours [1].".to_string())
    }

    fn backend(&self) -> BackendInfo {
        BackendInfo {
            model: "recording".to_string(),
            agent_id: None,
        }
    }
}

struct StubSearch {
    fail: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SearchError::ApiError {
                status: 503,
                message: "down".to_string(),
            });
        }
        Ok((0..num_results.min(2))
            .map(|i| SearchResult {
                title: format!("{} result {}", query, i),
                url: format!("https://bank.example/{}", i),
                snippet: format!("web snippet {}", i),
                published_date: None,
                source: "bank.example".to_string(),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn search_service(fail: bool) -> (Arc<SearchService>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = StubSearch {
        fail,
        calls: calls.clone(),
    };
    let service = SearchService::with_providers(SearchConfig::default(), vec![Box::new(provider)]);
    (Arc::new(service), calls)
}

async fn knowledge(embedder: &HashEmbedder) -> KnowledgeBase {
    let docs = vec![
        DocumentChunk {
            source: "cards.txt".to_string(),
            text: CARD_POLICY.to_string(),
        },
        DocumentChunk {
            source: "loans.txt".to_string(),
            text: "Loan rates reset quarterly.".to_string(),
        },
    ];
    let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
    let vectors = embedder.embed(&texts).await.unwrap();
    KnowledgeBase::build(docs, &vectors).unwrap()
}

async fn pipeline(
    with_knowledge: bool,
    completion: Arc<RecordingCompletion>,
) -> RagPipeline {
    let embedder = HashEmbedder::new(64).unwrap();
    let kb = if with_knowledge {
        Some(knowledge(&embedder).await)
    } else {
        None
    };
    RagPipeline::new(kb, Arc::new(embedder), completion, RagConfig::default())
}

#[tokio::test]
async fn test_good_local_match_skips_web() {
    let completion = Arc::new(RecordingCompletion::new());
    let (web, web_calls) = search_service(false);
    let pipeline = pipeline(true, completion.clone()).await.with_web_search(web);

    let answer = pipeline.answer(CARD_POLICY, &AskOptions::default()).await.unwrap();

    assert!(!answer.decision.use_web);
    assert_eq!(answer.context.provenance, Provenance::Local);
    assert_eq!(answer.context.passages[0].passage.source, "cards.txt");
    assert_eq!(web_calls.load(Ordering::SeqCst), 0);
    assert_eq!(answer.answer, "Call the helpline within 24 hours [1].");
}

#[tokio::test]
async fn test_weak_local_match_adds_web_after_local() {
    let completion = Arc::new(RecordingCompletion::new());
    let (web, web_calls) = search_service(false);
    let pipeline = pipeline(true, completion.clone()).await.with_web_search(web);

    let options = AskOptions {
        k: Some(1),
        threshold: Some(-1.0),
        ..AskOptions::default()
    };
    let answer = pipeline.answer("What is the card limit?", &options).await.unwrap();

    assert!(answer.decision.use_web);
    assert_eq!(answer.context.provenance, Provenance::LocalAndWeb);
    assert_eq!(answer.context.citations(), vec![1, 2, 3]);
    assert!(answer.context.passages[0].passage.is_local());
    assert_eq!(answer.context.web_count(), 2);
    assert_eq!(web_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_degraded_pipeline_answers_from_web_only() {
    let completion = Arc::new(RecordingCompletion::new());
    let (web, _) = search_service(false);
    let pipeline = pipeline(false, completion.clone()).await.with_web_search(web);
    assert!(pipeline.is_degraded());

    let answer = pipeline
        .answer("Current repo rate?", &AskOptions::default())
        .await
        .unwrap();

    assert_eq!(answer.context.provenance, Provenance::Web);
    assert_eq!(answer.decision.best_score, None);
}

#[tokio::test]
async fn test_failed_web_search_keeps_local_answer() {
    let completion = Arc::new(RecordingCompletion::new());
    let (web, web_calls) = search_service(true);
    let pipeline = pipeline(true, completion.clone()).await.with_web_search(web);

    let options = AskOptions {
        threshold: Some(-1.0),
        ..AskOptions::default()
    };
    let answer = pipeline.answer("card limit", &options).await.unwrap();

    assert_eq!(web_calls.load(Ordering::SeqCst), 1);
    assert_eq!(answer.context.provenance, Provenance::Local);
}

#[tokio::test]
async fn test_no_evidence_stops_before_completion() {
    let completion = Arc::new(RecordingCompletion::new());
    let (web, _) = search_service(true);
    let pipeline = pipeline(false, completion.clone()).await.with_web_search(web);

    let result = pipeline.answer("anything", &AskOptions::default()).await;

    assert!(matches!(result, Err(RagError::NoInformation)));
    assert_eq!(completion.count(), 0);
}

#[tokio::test]
async fn test_blank_question_is_rejected() {
    let completion = Arc::new(RecordingCompletion::new());
    let pipeline = pipeline(true, completion.clone()).await;

    let result = pipeline.answer("   ", &AskOptions::default()).await;
    assert!(matches!(result, Err(RagError::EmptyQuestion)));
    assert_eq!(completion.count(), 0);
}

#[tokio::test]
async fn test_prompt_carries_instruction_context_and_question() {
    let completion = Arc::new(RecordingCompletion::new());
    let pipeline = pipeline(true, completion.clone()).await;

    pipeline
        .answer(CARD_POLICY, &AskOptions::default())
        .await
        .unwrap();

    let prompt = completion.last_prompt();
    assert_eq!(prompt.len(), 2);
    assert_eq!(prompt[0].content, QA_SYSTEM_INSTRUCTION);
    assert!(prompt[1].content.starts_with("Context:\n[1] (cards.txt"));
    assert!(prompt[1]
        .content
        .ends_with(&format!("Question: {}", CARD_POLICY)));
}

fn write_index(dir: &std::path::Path, bytes: Vec<u8>) -> RagConfig {
    let config = RagConfig {
        index_path: dir.join("index.bin"),
        docs_path: dir.join("docs.json"),
        ..RagConfig::default()
    };
    std::fs::write(&config.index_path, bytes).unwrap();
    std::fs::write(&config.docs_path, "[]").unwrap();
    config
}

#[tokio::test]
async fn test_zero_width_index_loads_degraded() {
    let dir = tempfile::TempDir::new().unwrap();
    let bytes = bincode::serialize(&(String::from("hash-64"), 0u64, Vec::<f32>::new())).unwrap();
    let config = write_index(dir.path(), bytes);

    let pipeline = RagPipeline::load(
        config,
        Arc::new(HashEmbedder::new(64).unwrap()),
        Arc::new(RecordingCompletion::new()),
    );
    assert!(pipeline.is_degraded());
}

#[tokio::test]
async fn test_truncated_index_loads_degraded() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = write_index(dir.path(), vec![1, 2, 3]);

    let pipeline = RagPipeline::load(
        config,
        Arc::new(HashEmbedder::new(64).unwrap()),
        Arc::new(RecordingCompletion::new()),
    );
    assert!(pipeline.is_degraded());
}

#[tokio::test]
async fn test_index_from_another_embedder_loads_degraded() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = RagConfig {
        index_path: dir.path().join("index.bin"),
        docs_path: dir.path().join("docs.json"),
        ..RagConfig::default()
    };

    let dry_run = HashEmbedder::new(256).unwrap();
    knowledge(&dry_run)
        .await
        .with_embedder(dry_run.model_name())
        .save(&config.index_path, &config.docs_path)
        .unwrap();

    let mismatched = RagPipeline::load(
        config.clone(),
        Arc::new(HashEmbedder::new(64).unwrap()),
        Arc::new(RecordingCompletion::new()),
    );
    assert!(mismatched.is_degraded());

    let matched = RagPipeline::load(
        config,
        Arc::new(dry_run),
        Arc::new(RecordingCompletion::new()),
    );
    assert!(!matched.is_degraded());
}
