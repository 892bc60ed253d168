// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use finbot_bridge::rag::{assemble, Passage, Provenance, RagError};

fn local(n: usize) -> Vec<Passage> {
    (0..n)
        .map(|i| Passage::local(format!("policy{}.txt", i), format!("local text {}", i), 0.1))
        .collect()
}

fn web(n: usize) -> Vec<Passage> {
    (0..n)
        .map(|i| {
            Passage::web(
                format!("Result {}", i),
                format!("https://bank.example/{}", i),
                format!("web snippet {}", i),
            )
        })
        .collect()
}

#[test]
fn test_provenance_labels() {
    assert_eq!(assemble(local(2), vec![]).unwrap().provenance, Provenance::Local);
    assert_eq!(assemble(vec![], web(2)).unwrap().provenance, Provenance::Web);
    assert_eq!(
        assemble(local(1), web(1)).unwrap().provenance,
        Provenance::LocalAndWeb
    );
}

#[test]
fn test_nothing_to_assemble_is_an_error() {
    assert!(matches!(assemble(vec![], vec![]), Err(RagError::NoInformation)));
}

#[test]
fn test_citations_are_dense_and_local_first() {
    let context = assemble(local(3), web(2)).unwrap();

    assert_eq!(context.len(), 5);
    assert_eq!(context.citations(), vec![1, 2, 3, 4, 5]);
    assert!(context.passages[..3].iter().all(|c| c.passage.is_local()));
    assert!(context.passages[3..].iter().all(|c| !c.passage.is_local()));
    assert_eq!(context.web_count(), 2);
}

#[test]
fn test_render_marks_web_passages() {
    let context = assemble(local(1), web(1)).unwrap();
    let text = context.render();

    assert!(text.starts_with("[1] (policy0.txt"));
    assert!(text.contains("[2] Result 0 (from web search)"));
    assert!(text.contains("Source: https://bank.example/0"));
    assert!(text.contains("local text 0"));
    assert!(text.contains("web snippet 0"));
}
