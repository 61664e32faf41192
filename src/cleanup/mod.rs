//! Chunk cleanup: normalization, filtering, splitting and deduplication.
//!
//! Raw chunks from the extractors are normalized, filtered against the
//! length, word-count and advertising rules, split when they carry more than
//! `max_word_count` words, and deduplicated. A chunk is a duplicate when the
//! lowercased first 80 chars of its text were already seen, or when its text
//! contains, or is contained in, an accepted chunk's text (case-insensitive).
//!
//! Pieces of a split chunk keep their `chunk_index` and skip the length and
//! advertising rules their parent already passed; they still need the minimum
//! word count and are deduplicated like any other chunk. Pieces never exceed
//! `max_word_count`, so cleaning an already cleaned sequence changes nothing.

mod chunking;

use std::collections::HashSet;

use crate::config::Config;
use crate::patterns::{Heuristics, WHITESPACE_NORMALIZE};
use crate::result::Chunk;
use crate::selector::is_advertisement_text;

pub use chunking::{intelligent_chunking, sentences, PieceBound};

/// Chars of lowercased text used as the deduplication key.
const DEDUP_KEY_LEN: usize = 80;

/// Collapse whitespace runs to single spaces, drop non-printable chars and
/// trim.
#[must_use]
pub fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE_NORMALIZE.replace_all(text, " ");
    collapsed
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '\u{200b}' | '\u{feff}'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Number of whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The first `chars` chars of `text`.
pub(crate) fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Accepted chunks plus the state needed to reject duplicates.
struct Deduplicator<'a> {
    config: &'a Config,
    heuristics: &'a Heuristics,
    seen: HashSet<String>,
    accepted: Vec<Chunk>,
    accepted_lower: Vec<String>,
}

impl<'a> Deduplicator<'a> {
    fn new(config: &'a Config, heuristics: &'a Heuristics) -> Self {
        Self {
            config,
            heuristics,
            seen: HashSet::new(),
            accepted: Vec::new(),
            accepted_lower: Vec::new(),
        }
    }

    /// Minimum word check, plus the length and advertising checks for chunks
    /// that are not pieces of a split parent.
    fn passes_filters(&self, text: &str, piece: bool) -> bool {
        if word_count(text) < self.config.min_word_count {
            return false;
        }
        piece
            || (text.chars().count() >= self.config.min_text_length
                && !is_advertisement_text(text, self.heuristics))
    }

    fn admit(&mut self, mut chunk: Chunk) {
        if !self.passes_filters(&chunk.content, chunk.chunk_index.is_some()) {
            return;
        }
        let lower = chunk.content.to_lowercase();
        let key = char_prefix(&lower, DEDUP_KEY_LEN).to_string();
        if self.seen.contains(&key) {
            return;
        }
        if self
            .accepted_lower
            .iter()
            .any(|existing| existing.contains(lower.as_str()) || lower.contains(existing.as_str()))
        {
            return;
        }
        self.seen.insert(key);
        chunk.word_count = word_count(&chunk.content);
        self.accepted.push(chunk);
        self.accepted_lower.push(lower);
    }

    fn process(&mut self, chunk: Chunk) {
        let normalized = normalize(&chunk.content);
        if !self.passes_filters(&normalized, chunk.chunk_index.is_some()) {
            return;
        }

        if word_count(&normalized) > self.config.max_word_count {
            let bound = PieceBound::new(self.config.max_chunk_size, self.config.max_word_count);
            let pieces = intelligent_chunking(&chunk.content, bound);
            tracing::trace!(order = chunk.order, pieces = pieces.len(), "splitting oversized chunk");
            for (index, piece) in pieces.into_iter().enumerate() {
                self.admit(Chunk {
                    content: piece,
                    chunk_index: Some(index),
                    ..chunk.clone()
                });
            }
            return;
        }

        self.admit(Chunk {
            content: normalized,
            ..chunk
        });
    }
}

/// Clean a raw chunk sequence, preserving input order among survivors.
#[must_use]
pub fn clean_chunks(chunks: Vec<Chunk>, config: &Config, heuristics: &Heuristics) -> Vec<Chunk> {
    let mut dedup = Deduplicator::new(config, heuristics);
    for chunk in chunks {
        dedup.process(chunk);
    }
    dedup.accepted
}
