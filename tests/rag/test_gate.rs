// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use finbot_bridge::rag::{
    gate, Passage, RetrievalGate, DEFAULT_GATE_THRESHOLD, DEFAULT_QUALITY_THRESHOLD,
};

fn at(distances: &[f32]) -> Vec<Passage> {
    distances
        .iter()
        .enumerate()
        .map(|(i, d)| Passage::local(format!("doc{}.txt", i), "text", *d))
        .collect()
}

#[test]
fn test_empty_retrieval_goes_to_web() {
    let decision = gate(&[], DEFAULT_GATE_THRESHOLD);
    assert!(decision.use_web);
    assert_eq!(decision.best_score, None);
}

#[test]
fn test_decision_uses_best_passage_only() {
    let passages = at(&[0.95, 0.2, 0.9]);
    let decision = gate(&passages, 0.3);
    assert!(!decision.use_web);
    assert_eq!(decision.best_score, Some(0.2));
}

#[test]
fn test_threshold_is_exclusive() {
    assert!(!gate(&at(&[0.7]), 0.7).use_web);
    assert!(gate(&at(&[0.71]), 0.7).use_web);
}

#[test]
fn test_order_of_passages_does_not_matter() {
    let forward = gate(&at(&[0.1, 0.5, 0.9]), 0.4);
    let backward = gate(&at(&[0.9, 0.5, 0.1]), 0.4);
    assert_eq!(forward, backward);
}

#[test]
fn test_raising_threshold_never_adds_web() {
    let passages = at(&[0.45, 0.6]);
    let mut previous = true;
    for threshold in [0.0, 0.2, 0.44, 0.45, 0.5, 0.9, 1.5] {
        let use_web = gate(&passages, threshold).use_web;
        assert!(previous || !use_web, "threshold {} flipped back to web", threshold);
        previous = use_web;
    }
}

#[test]
fn test_gate_does_not_mutate_or_reorder() {
    let passages = at(&[0.9, 0.1]);
    let snapshot = passages.clone();
    gate(&passages, 0.5);
    assert_eq!(passages, snapshot);
}

#[test]
fn test_retrieval_gate_thresholds() {
    assert_eq!(RetrievalGate::default().threshold(), DEFAULT_GATE_THRESHOLD);

    let strict = RetrievalGate::new(DEFAULT_QUALITY_THRESHOLD);
    let passages = at(&[0.5]);
    assert!(strict.evaluate(&passages).use_web);
    assert!(!RetrievalGate::default().evaluate(&passages).use_web);
}
