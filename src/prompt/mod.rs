#[cfg(test)]
mod tests;

use std::fmt::Write as _;

use crate::retriever::ScoredChunk;

/// Assemble a completion prompt from retrieved chunks and the user query.
///
/// Deterministic: chunk order follows retrieval order, so the same
/// retrieval always yields the same prompt.
#[inline]
pub fn build_prompt(chunks: &[ScoredChunk], query: &str) -> String {
    let mut prompt = String::from(
        "Answer the question using only the context below. \
         If the context does not contain the answer, say so.\n\nContext:\n",
    );

    for (i, chunk) in chunks.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, chunk.text);
    }

    let _ = write!(prompt, "\nQuestion: {query}\nAnswer:");
    prompt
}
