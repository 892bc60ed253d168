// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question answering commands

use anyhow::{anyhow, Result};
use clap::Args;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::inference::{MistralClient, MistralConfig};
use crate::rag::{AskOptions, RagAnswer, RagConfig, RagError, RagPipeline};
use crate::search::{SearchConfig, SearchService};

/// Arguments for the ask command
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

/// Arguments for the chat command
#[derive(Args, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub tuning: TuningArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TuningArgs {
    /// Passages retrieved from the knowledge base
    #[arg(long, env = "RAG_TOP_K", default_value_t = 6)]
    pub k: usize,

    /// Sampling temperature for the answer
    #[arg(long, default_value_t = 0.2)]
    pub temperature: f32,

    /// Distance above which the web is searched
    #[arg(long, env = "RAG_QUALITY_THRESHOLD", default_value_t = 0.3)]
    pub threshold: f32,

    /// Never fall back to web search
    #[arg(long)]
    pub no_web: bool,
}

impl TuningArgs {
    fn options(&self) -> AskOptions {
        AskOptions {
            k: Some(self.k),
            temperature: Some(self.temperature),
            threshold: Some(self.threshold),
        }
    }
}

/// Pipeline backed by Mistral for both embeddings and answers
pub fn build_pipeline(no_web: bool) -> Result<RagPipeline> {
    let mistral_config = MistralConfig::from_env();
    if !mistral_config.has_api_key() {
        return Err(anyhow!("MISTRAL_API_KEY is not set"));
    }
    let mistral = Arc::new(MistralClient::new(mistral_config));

    let pipeline = RagPipeline::load(RagConfig::from_env(), mistral.clone(), mistral);
    if pipeline.is_degraded() {
        warn!("Answering without a local knowledge base");
    }

    if no_web {
        return Ok(pipeline);
    }

    let search_config = SearchConfig::from_env();
    if let Err(e) = search_config.validate() {
        warn!("Web search disabled: {}", e);
        return Ok(pipeline);
    }
    let service = SearchService::new(search_config);
    if !service.is_usable() {
        return Ok(pipeline);
    }
    Ok(pipeline.with_web_search(Arc::new(service)))
}

pub async fn run_ask(args: AskArgs) -> Result<()> {
    let pipeline = build_pipeline(args.tuning.no_web)?;
    let answer = pipeline
        .answer(&args.question, &args.tuning.options())
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    print_answer(&answer);
    Ok(())
}

pub async fn run_chat(args: ChatArgs) -> Result<()> {
    let pipeline = build_pipeline(args.tuning.no_web)?;
    let options = args.tuning.options();

    println!("💬 Ask a question (type 'exit' to quit)");
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        match pipeline.answer(question, &options).await {
            Ok(answer) => print_answer(&answer),
            Err(RagError::EmptyQuestion) => continue,
            Err(e) => println!("{}\n", e.user_message()),
        }
    }

    Ok(())
}

fn print_answer(answer: &RagAnswer) {
    println!("{}\n", answer.answer.trim());
    println!(
        "Sources: {} passages ({}), web fallback: {}",
        answer.context.len(),
        answer.context.provenance,
        if answer.decision.use_web { "yes" } else { "no" }
    );
    if let Some(best) = answer.decision.best_score {
        println!(
            "Best distance: {:.3} (threshold {:.3})",
            best, answer.decision.threshold
        );
    }
    println!();
}
