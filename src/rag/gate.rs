// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrieval quality gate
//!
//! Decides whether locally retrieved passages are good enough on their own or
//! a web search has to supplement them.
//!
//! Scores are cosine distances: `0.0` is identical, larger is worse. The gate
//! asks for the web whenever nothing was retrieved or the closest passage is
//! strictly farther than the threshold. A distance threshold of `0.3` is the
//! same cut as a similarity floor of `0.7`.

use serde::{Deserialize, Serialize};

use super::types::Passage;

/// Threshold used when a caller does not pick one
pub const DEFAULT_GATE_THRESHOLD: f32 = 0.7;

/// Threshold used by the answer pipeline's quality check
pub const DEFAULT_QUALITY_THRESHOLD: f32 = 0.3;

/// Outcome of a gate evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub use_web: bool,
    pub threshold: f32,
    /// Lowest distance seen, `None` when nothing was retrieved
    pub best_score: Option<f32>,
}

/// Pure decision over already-fetched local passages
pub fn gate(local_passages: &[Passage], threshold: f32) -> GateDecision {
    let best_score = local_passages
        .iter()
        .map(|p| p.score)
        .filter(|s| !s.is_nan())
        .min_by(|a, b| a.total_cmp(b));

    let use_web = match best_score {
        None => true,
        Some(best) => best > threshold,
    };

    GateDecision {
        use_web,
        threshold,
        best_score,
    }
}

/// A gate with a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalGate {
    threshold: f32,
}

impl RetrievalGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn evaluate(&self, local_passages: &[Passage]) -> GateDecision {
        gate(local_passages, self.threshold)
    }
}

impl Default for RetrievalGate {
    fn default() -> Self {
        Self::new(DEFAULT_GATE_THRESHOLD)
    }
}
