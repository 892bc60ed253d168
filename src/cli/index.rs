// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Offline knowledge base builder

use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::embeddings::{embed_in_batches, Embedder, HashEmbedder};
use crate::inference::{MistralClient, MistralConfig};
use crate::rag::{Chunker, DocumentChunk, KnowledgeBase};

/// Texts sent per embedding request
pub const EMBED_BATCH_SIZE: usize = 64;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// Arguments for the index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Directory holding .txt / .md source documents
    #[arg(long)]
    pub input: PathBuf,

    /// Characters per chunk
    #[arg(long, default_value_t = 512)]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, default_value_t = 64)]
    pub overlap: usize,

    /// Output index file
    #[arg(long, env = "RAG_INDEX_PATH", default_value = "index.bin")]
    pub index_path: PathBuf,

    /// Output metadata file
    #[arg(long, env = "RAG_DOCS_PATH", default_value = "docs.json")]
    pub docs_path: PathBuf,

    /// Use the offline hash embedder instead of the Mistral API
    #[arg(long)]
    pub dry_run: bool,

    /// Vector width for --dry-run
    #[arg(long, default_value_t = 256)]
    pub dimensions: usize,
}

pub async fn run_index(args: IndexArgs) -> Result<()> {
    let chunker = Chunker::new(args.chunk_size, args.overlap)?;
    let documents = collect_documents(&args.input, &chunker)?;
    if documents.is_empty() {
        return Err(anyhow!(
            "No .txt or .md content found in {}",
            args.input.display()
        ));
    }
    println!("📄 {} chunks from {}", documents.len(), args.input.display());

    let embedder: Arc<dyn Embedder> = if args.dry_run {
        Arc::new(HashEmbedder::new(args.dimensions)?)
    } else {
        let config = MistralConfig::from_env();
        if !config.has_api_key() {
            return Err(anyhow!(
                "MISTRAL_API_KEY is not set (use --dry-run for an offline index)"
            ));
        }
        Arc::new(MistralClient::new(config))
    };

    let knowledge = build_knowledge_base(documents, embedder.as_ref()).await?;
    knowledge.save(&args.index_path, &args.docs_path)?;

    println!(
        "✅ Wrote {} vectors ({}D) to {} and {}",
        knowledge.len(),
        knowledge.dimensions(),
        args.index_path.display(),
        args.docs_path.display()
    );
    Ok(())
}

/// Chunk every supported file under `dir`, in file-name order
pub fn collect_documents(dir: &Path, chunker: &Chunker) -> Result<Vec<DocumentChunk>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_supported(path))
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let chunks = chunker.split(&text);
        info!("{}: {} chunks", source, chunks.len());
        documents.extend(chunks.into_iter().map(|text| DocumentChunk {
            source: source.clone(),
            text,
        }));
    }

    Ok(documents)
}

/// Embed the chunks and pair them with their vectors
pub async fn build_knowledge_base(
    documents: Vec<DocumentChunk>,
    embedder: &dyn Embedder,
) -> Result<KnowledgeBase> {
    let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
    let vectors = embed_in_batches(embedder, &texts, EMBED_BATCH_SIZE).await?;
    Ok(KnowledgeBase::build(documents, &vectors)?.with_embedder(embedder.model_name()))
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
