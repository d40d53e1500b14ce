//! Grounding prompt composition.
//!
//! The template is a fixed contract: retrieval context first, then the
//! question, then the instruction to answer only from the context. Tests
//! pin its exact shape; changing it silently would change every answer.

/// Substituted for the context section when retrieval found nothing.
pub const NO_CONTEXT_PLACEHOLDER: &str = "No context provided.";

/// Composes the grounding prompt from the question and retrieved chunks.
///
/// Chunks are joined with a blank line, in retrieval order.
pub fn compose(question: &str, context_chunks: &[String]) -> String {
    let context = if context_chunks.is_empty() {
        NO_CONTEXT_PLACEHOLDER.to_string()
    } else {
        context_chunks.join("\n\n")
    };

    format!("Context:\n{context}\n\nQuestion: {question}\nAnswer concisely based on the context.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_exact_template() {
        let chunks = vec!["first chunk".to_string(), "second chunk".to_string()];
        let prompt = compose("What is this about?", &chunks);

        assert_eq!(
            prompt,
            "Context:\nfirst chunk\n\nsecond chunk\n\nQuestion: What is this about?\nAnswer concisely based on the context."
        );
    }

    #[test]
    fn empty_context_uses_placeholder() {
        let prompt = compose("What is this about?", &[]);

        assert_eq!(
            prompt,
            "Context:\nNo context provided.\n\nQuestion: What is this about?\nAnswer concisely based on the context."
        );
    }

    #[test]
    fn single_chunk_has_no_extra_separators() {
        let chunks = vec!["only chunk".to_string()];
        let prompt = compose("Why?", &chunks);

        assert_eq!(
            prompt,
            "Context:\nonly chunk\n\nQuestion: Why?\nAnswer concisely based on the context."
        );
    }
}
