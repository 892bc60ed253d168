// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Context assembly
//!
//! Local passages are always cited before web passages. Citation numbers
//! start at 1 and follow that order.

use serde::Serialize;

use super::errors::RagError;
use super::types::{Passage, PassageOrigin, Provenance};

/// Column width for wrapped passage text
const WRAP_WIDTH: usize = 100;

/// A passage with its citation number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitedPassage {
    pub citation: usize,
    pub passage: Passage,
}

impl CitedPassage {
    fn render(&self) -> String {
        match self.passage.origin {
            PassageOrigin::Local => format!(
                "[{}] ({}, score={:.3})\n{}",
                self.citation,
                self.passage.source,
                self.passage.score,
                fill(&self.passage.text, WRAP_WIDTH)
            ),
            PassageOrigin::Web => format!(
                "[{}] {} (from web search)\nSource: {}\n{}",
                self.citation,
                self.passage.title.as_deref().unwrap_or("Untitled"),
                self.passage.source,
                fill(&self.passage.text, WRAP_WIDTH)
            ),
        }
    }
}

/// Ordered, numbered evidence handed to the completion backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Context {
    pub passages: Vec<CitedPassage>,
    pub provenance: Provenance,
}

impl Context {
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn citations(&self) -> Vec<usize> {
        self.passages.iter().map(|p| p.citation).collect()
    }

    pub fn web_count(&self) -> usize {
        self.passages
            .iter()
            .filter(|p| p.passage.origin == PassageOrigin::Web)
            .count()
    }

    /// Prompt-ready text, one block per passage separated by blank lines
    pub fn render(&self) -> String {
        self.passages
            .iter()
            .map(CitedPassage::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Greedy word wrap; words longer than `width` get a line of their own
fn fill(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

/// Merge local and web passages into one numbered context
///
/// Returns `RagError::NoInformation` when both inputs are empty; callers must
/// stop the query there rather than call the completion backend.
pub fn assemble(local: Vec<Passage>, web: Vec<Passage>) -> Result<Context, RagError> {
    let provenance = match (local.is_empty(), web.is_empty()) {
        (true, true) => return Err(RagError::NoInformation),
        (false, true) => Provenance::Local,
        (false, false) => Provenance::LocalAndWeb,
        (true, false) => Provenance::Web,
    };

    let passages = local
        .into_iter()
        .chain(web)
        .enumerate()
        .map(|(i, passage)| CitedPassage {
            citation: i + 1,
            passage,
        })
        .collect();

    Ok(Context {
        passages,
        provenance,
    })
}
