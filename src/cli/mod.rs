// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod ask;
pub mod index;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// FinBot knowledge base CLI
#[derive(Parser, Debug)]
#[command(name = "finbot-cli")]
#[command(version)]
#[command(about = "Build the FinBot knowledge base and query it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk, embed and index a directory of documents
    Index(index::IndexArgs),

    /// Answer one question from the knowledge base
    Ask(ask::AskArgs),

    /// Interactive question loop
    Chat(ask::ChatArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Index(args) => index::run_index(args).await,
        Commands::Ask(args) => ask::run_ask(args).await,
        Commands::Chat(args) => ask::run_chat(args).await,
    }
}
