//! Quality assessment over the final chunk sequence.
//!
//! Decides whether a page carries enough structured text to be worth storing
//! for retrieval, and explains the verdict with a small set of flags and two
//! 0-100 scores.

use std::collections::HashSet;

use crate::result::{Chunk, Importance, QualityAssessment, QualityFlags, RagAssessment, StructureType};

/// Words needed for a page to count as content-rich.
pub const CONTENT_RICH_WORDS: usize = 200;

/// Chunks needed, together with content richness, for `rag_ready`.
pub const RAG_READY_CHUNKS: usize = 5;

/// Words below which content is reported as limited.
pub const LIMITED_CONTENT_WORDS: usize = 100;

/// Acceptable range for the rounded average words per chunk.
pub const GOOD_CHUNK_WORDS: std::ops::RangeInclusive<usize> = 15..=300;

/// Distinct chunk types above which the page has variety.
pub const VARIETY_THRESHOLD: usize = 3;

/// Recommendation for pages ready for ingestion.
pub const RECOMMEND_EXCELLENT: &str = "Excellent for RAG ingestion - rich content with good structure";

/// Recommendation for pages with very little text.
pub const RECOMMEND_LIMITED: &str = "Limited content detected. Page may be dynamic or content-light.";

/// Recommendation for everything in between.
pub const RECOMMEND_USABLE: &str =
    "Usable content but may benefit from additional sources for comprehensive coverage.";

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round().min(100.0) as u8
}

/// Assess a final (cleaned and ranked) chunk sequence.
#[must_use]
pub fn assess(chunks: &[Chunk]) -> QualityAssessment {
    let total_words: usize = chunks.iter().map(|c| c.word_count).sum();
    let average_words_per_chunk = (total_words as f64 / chunks.len().max(1) as f64).round() as usize;

    let has_headings = chunks.iter().any(|c| c.kind.is_heading());
    let has_context = chunks.iter().any(|c| !c.heading.is_empty());
    let variety_score = chunks.iter().map(|c| &c.kind).collect::<HashSet<_>>().len();
    let high_importance = chunks.iter().filter(|c| c.importance == Importance::High).count();

    let quality = QualityFlags {
        is_content_rich: total_words >= CONTENT_RICH_WORDS,
        has_good_chunk_size: GOOD_CHUNK_WORDS.contains(&average_words_per_chunk),
        has_structure: has_headings || has_context,
        has_variety: variety_score > VARIETY_THRESHOLD,
        has_high_quality_content: high_importance > 0,
        rag_ready: total_words >= CONTENT_RICH_WORDS && chunks.len() >= RAG_READY_CHUNKS,
    };

    let recommendation = if quality.rag_ready {
        RECOMMEND_EXCELLENT
    } else if total_words < LIMITED_CONTENT_WORDS {
        RECOMMEND_LIMITED
    } else {
        RECOMMEND_USABLE
    };

    let scored = quality.scored();
    let rag_assessment = RagAssessment {
        // The word floor is implied by rag_ready; kept as documented.
        suitable: quality.rag_ready && total_words >= LIMITED_CONTENT_WORDS,
        recommendation: recommendation.to_string(),
        content_score: percent(total_words, 1000),
        quality_score: percent(scored.iter().filter(|f| **f).count(), scored.len()),
    };

    let structure_type = if has_headings {
        StructureType::Headings
    } else if has_context {
        StructureType::Contextual
    } else {
        StructureType::Minimal
    };

    QualityAssessment {
        total_words,
        average_words_per_chunk,
        quality,
        rag_assessment,
        variety_score,
        structure_type,
    }
}
