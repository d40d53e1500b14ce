//! Text chunking for retrieval.
//!
//! Splits extracted document text into bounded chunks that fit a token
//! budget. Packing is paragraph-greedy: paragraphs accumulate into a chunk
//! until the budget would overflow, and a paragraph too large to fit any
//! chunk on its own is split at word boundaries instead.
//!
//! Token counts are a heuristic (whitespace-separated words divided by
//! 0.75), not tokenizer output. The constant is part of the packing
//! contract: changing it moves every chunk boundary in every stored
//! collection.

use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

/// Approximate words per token. Fixed; see module docs.
const WORDS_PER_TOKEN: f64 = 0.75;

/// Errors that can occur during chunking.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// The input contained no text after trimming whitespace.
    #[error("no usable text to chunk")]
    EmptyInput,

    /// A zero token budget can never admit a chunk.
    #[error("max_tokens must be greater than zero")]
    ZeroTokenBudget,
}

/// Result type for chunking operations.
pub type Result<T> = std::result::Result<T, ChunkError>;

/// A bounded unit of document text, the smallest retrievable item.
///
/// Chunks are created only by [`chunk_text`] and never mutated. The id is
/// assigned at creation and doubles as the vector store point id.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: Uuid,
    /// Chunk text. Never empty and at least `min_chunk_size` characters.
    pub text: String,
    /// Heuristic token count. At most `max_tokens`, except for a chunk
    /// forced to hold a single word that alone exceeds the budget.
    pub token_estimate: f64,
}

/// Outcome of chunking a document.
///
/// `NoUsableContent` means the input passed validation but every candidate
/// chunk fell below the minimum size. Callers must treat it as "no usable
/// chunks", not as an error.
#[derive(Debug, Clone)]
pub enum ChunkOutcome {
    Chunks(Vec<Chunk>),
    NoUsableContent,
}

impl ChunkOutcome {
    /// The emitted chunks; empty for `NoUsableContent`.
    pub fn chunks(&self) -> &[Chunk] {
        match self {
            ChunkOutcome::Chunks(chunks) => chunks,
            ChunkOutcome::NoUsableContent => &[],
        }
    }
}

/// Accumulates pieces of text until a flush emits them as one chunk.
///
/// Both packing levels use this: paragraphs joined by blank lines, words
/// joined by spaces.
struct Accumulator {
    buffer: String,
    token_count: f64,
    separator: &'static str,
}

impl Accumulator {
    fn new(separator: &'static str) -> Self {
        Self {
            buffer: String::new(),
            token_count: 0.0,
            separator,
        }
    }

    fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn append(&mut self, piece: &str, tokens: f64) {
        if !self.buffer.is_empty() {
            self.buffer.push_str(self.separator);
        }
        self.buffer.push_str(piece);
        self.token_count += tokens;
    }

    /// Emits the buffer as a chunk if it meets the size floor, then resets.
    /// Undersized buffers are discarded.
    fn flush(&mut self, min_chunk_size: usize, out: &mut Vec<Chunk>) {
        if !self.buffer.is_empty() && self.buffer.chars().count() >= min_chunk_size {
            out.push(Chunk {
                id: Uuid::new_v4(),
                text: std::mem::take(&mut self.buffer),
                token_estimate: self.token_count,
            });
        } else {
            self.buffer.clear();
        }
        self.token_count = 0.0;
    }
}

/// Heuristic token estimate: whitespace-separated words divided by 0.75.
fn estimate_tokens(text: &str) -> f64 {
    text.split_whitespace().count() as f64 / WORDS_PER_TOKEN
}

/// Collapses every run of blank lines into a single paragraph break and
/// trims the ends.
fn normalize(text: &str) -> String {
    let blank_runs = Regex::new(r"\n\s*\n+").expect("static pattern");
    blank_runs.replace_all(text.trim(), "\n\n").into_owned()
}

/// Word-level splitting for a paragraph whose own estimate exceeds the
/// budget. Words accumulate until the next one would overflow; each full
/// buffer flushes as its own chunk. A single word that alone exceeds the
/// budget is emitted as-is.
fn split_oversized(paragraph: &str, budget: f64, min_chunk_size: usize, out: &mut Vec<Chunk>) {
    let word_tokens = 1.0 / WORDS_PER_TOKEN;
    let mut words = Accumulator::new(" ");

    for word in paragraph.split_whitespace() {
        if !words.is_empty() && words.token_count + word_tokens > budget {
            words.flush(min_chunk_size, out);
        }
        words.append(word, word_tokens);
    }
    words.flush(min_chunk_size, out);
}

/// Splits `text` into ordered chunks of at most `max_tokens` estimated
/// tokens each.
///
/// Paragraphs (blank-line separated) pack greedily into chunks. A paragraph
/// that alone exceeds the budget is split at word granularity and never
/// merges with neighboring paragraphs. A paragraph estimating exactly
/// `max_tokens` still fits (the boundary is strict).
///
/// Candidate chunks shorter than `min_chunk_size` characters are silently
/// dropped, including a trailing accumulation at the end of the document.
/// The tail-drop loses content; callers that cannot afford that must pass
/// `min_chunk_size = 0`.
///
/// # Errors
///
/// `EmptyInput` if `text` is empty after trimming, `ZeroTokenBudget` if
/// `max_tokens` is zero.
pub fn chunk_text(text: &str, max_tokens: usize, min_chunk_size: usize) -> Result<ChunkOutcome> {
    if max_tokens == 0 {
        return Err(ChunkError::ZeroTokenBudget);
    }
    if text.trim().is_empty() {
        return Err(ChunkError::EmptyInput);
    }

    let budget = max_tokens as f64;
    let normalized = normalize(text);

    let mut chunks = Vec::new();
    let mut current = Accumulator::new("\n\n");

    for paragraph in normalized.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        let paragraph_tokens = estimate_tokens(paragraph);

        if paragraph_tokens > budget {
            // Flush pending paragraphs first so output stays in source
            // order, then split this one at word granularity.
            current.flush(min_chunk_size, &mut chunks);
            split_oversized(paragraph, budget, min_chunk_size, &mut chunks);
            continue;
        }

        if current.token_count + paragraph_tokens > budget {
            current.flush(min_chunk_size, &mut chunks);
        }
        current.append(paragraph, paragraph_tokens);
    }

    current.flush(min_chunk_size, &mut chunks);

    if chunks.is_empty() {
        return Ok(ChunkOutcome::NoUsableContent);
    }
    Ok(ChunkOutcome::Chunks(chunks))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
    }

    fn texts(outcome: &ChunkOutcome) -> Vec<&str> {
        outcome.chunks().iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            chunk_text("", 256, 25),
            Err(ChunkError::EmptyInput)
        ));
        assert!(matches!(
            chunk_text("  \n\n \t ", 256, 25),
            Err(ChunkError::EmptyInput)
        ));
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(matches!(
            chunk_text("some text", 0, 0),
            Err(ChunkError::ZeroTokenBudget)
        ));
    }

    #[test]
    fn short_text_yields_no_usable_content() {
        let outcome = chunk_text("short", 256, 25).unwrap();
        assert!(matches!(outcome, ChunkOutcome::NoUsableContent));
        assert!(outcome.chunks().is_empty());
    }

    #[test]
    fn forty_word_paragraph_is_one_chunk() {
        let text = words(40);
        let outcome = chunk_text(&text, 256, 25).unwrap();

        let chunks = outcome.chunks();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert!((chunks[0].token_estimate - 40.0 / 0.75).abs() < 1e-9);
    }

    #[test]
    fn paragraph_exactly_at_budget_fits() {
        // 30 words / 0.75 = 40.0 tokens: exactly the budget, boundary is
        // strict greater-than.
        let text = words(30);
        let outcome = chunk_text(&text, 40, 1).unwrap();
        assert_eq!(outcome.chunks().len(), 1);
    }

    #[test]
    fn small_paragraphs_pack_into_one_chunk() {
        let text = "first paragraph with several words here.\n\nsecond paragraph with several words too.";
        let outcome = chunk_text(text, 256, 10).unwrap();

        let chunks = outcome.chunks();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn overflowing_paragraph_starts_a_new_chunk() {
        // Two 30-word paragraphs at 40.0 tokens each: the second cannot
        // join the first without blowing the budget.
        let text = format!("{}\n\n{}", words(30), words(30));
        let outcome = chunk_text(&text, 40, 1).unwrap();

        let chunks = outcome.chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, words(30));
        assert_eq!(chunks[1].text, words(30));
    }

    #[test]
    fn oversized_paragraph_splits_at_word_level() {
        // 30 words at 40.0 tokens against a budget of 10: word-level split.
        // Each word is 4/3 tokens, so 7 words fit (9.33) and the eighth
        // would overflow.
        let text = words(30);
        let outcome = chunk_text(&text, 10, 1).unwrap();

        let chunks = outcome.chunks();
        assert_eq!(chunks.len(), 5);
        for chunk in &chunks[..4] {
            assert_eq!(chunk.text.split_whitespace().count(), 7);
            assert!(chunk.token_estimate <= 10.0);
        }
        assert_eq!(chunks[4].text.split_whitespace().count(), 2);

        // Word order survives the split.
        let rejoined = texts(&outcome).join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn single_oversized_word_is_emitted_as_is() {
        // Budget of 1 token, each word estimates 4/3: every word is forced
        // into its own chunk and may exceed the budget.
        let outcome = chunk_text("alpha beta", 1, 1).unwrap();

        let chunks = outcome.chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "alpha");
        assert_eq!(chunks[1].text, "beta");
        assert!(chunks[0].token_estimate > 1.0);
    }

    #[test]
    fn word_split_fragments_below_floor_are_dropped() {
        // Fragments of ~7 short words are well under 80 characters, so
        // nothing survives the floor.
        let outcome = chunk_text(&words(30), 10, 80).unwrap();
        assert!(matches!(outcome, ChunkOutcome::NoUsableContent));
    }

    #[test]
    fn trailing_chunk_below_floor_is_dropped() {
        // The 9-word paragraph fills the budget; "tiny" is left as the
        // trailing accumulation and falls under the 10-character floor.
        let text = format!("{}\n\ntiny", words(9));
        let outcome = chunk_text(&text, 12, 10).unwrap();

        let chunks = outcome.chunks();
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].text.contains("tiny"));
    }

    #[test]
    fn blank_line_runs_are_normalized() {
        let text = "para one here.\n\n\n   \n\npara two here.";
        let outcome = chunk_text(text, 256, 5).unwrap();

        let chunks = outcome.chunks();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "para one here.\n\npara two here.");
    }

    #[test]
    fn chunk_order_matches_source_order() {
        // A small paragraph, then an oversized one, then another small one:
        // emitted chunks must follow source order.
        let first = "the opening paragraph sits here.";
        let last = "the closing paragraph sits here.";
        let text = format!("{first}\n\n{}\n\n{last}", words(30));
        let outcome = chunk_text(&text, 10, 1).unwrap();

        let chunks = outcome.chunks();
        assert_eq!(chunks.first().unwrap().text, first);
        assert_eq!(chunks.last().unwrap().text, last);
        assert!(chunks[1].text.starts_with("word0"));
    }

    #[test]
    fn concatenation_reconstructs_normalized_text() {
        // With no floor and no oversized paragraphs, joining the chunks
        // with the paragraph separator reproduces the normalized input.
        let text = format!("{}\n\n{}\n\n{}", words(20), words(25), words(30));
        let outcome = chunk_text(&text, 40, 0).unwrap();

        assert_eq!(texts(&outcome).join("\n\n"), text);
    }

    #[test]
    fn estimates_stay_within_budget_for_fitting_paragraphs() {
        let text = format!("{}\n\n{}\n\n{}\n\n{}", words(10), words(20), words(15), words(25));
        let outcome = chunk_text(&text, 40, 1).unwrap();

        for chunk in outcome.chunks() {
            assert!(chunk.token_estimate <= 40.0);
        }
    }

    #[test]
    fn ids_are_unique() {
        let text = format!("{}\n\n{}", words(30), words(30));
        let outcome = chunk_text(&text, 40, 1).unwrap();

        let chunks = outcome.chunks();
        assert_ne!(chunks[0].id, chunks[1].id);
    }
}
