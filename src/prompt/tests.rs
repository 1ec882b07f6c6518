use super::*;

fn scored(text: &str, score: f32) -> ScoredChunk {
    ScoredChunk {
        text: text.to_string(),
        score,
    }
}

#[test]
fn prompt_contains_chunks_and_question() {
    let chunks = vec![
        scored("Rust is a systems language.", 0.92),
        scored("It guarantees memory safety.", 0.87),
    ];

    let prompt = build_prompt(&chunks, "What is Rust?");

    assert!(prompt.contains("1. Rust is a systems language."));
    assert!(prompt.contains("2. It guarantees memory safety."));
    assert!(prompt.contains("Question: What is Rust?"));
    assert!(prompt.ends_with("Answer:"));
}

#[test]
fn prompt_preserves_retrieval_order() {
    let chunks = vec![scored("second best", 0.5), scored("actually first", 0.9)];

    let prompt = build_prompt(&chunks, "q");

    let first = prompt.find("second best").expect("chunk present");
    let second = prompt.find("actually first").expect("chunk present");
    assert!(first < second);
}

#[test]
fn prompt_is_deterministic() {
    let chunks = vec![scored("context", 1.0)];

    assert_eq!(build_prompt(&chunks, "q"), build_prompt(&chunks, "q"));
}

#[test]
fn empty_retrieval_still_produces_a_question() {
    let prompt = build_prompt(&[], "unanswerable?");

    assert!(prompt.contains("Question: unanswerable?"));
}
