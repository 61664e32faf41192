//! Result types for extraction output.
//!
//! This module defines the structured output of one extraction invocation:
//! page metadata, the ranked chunk sequence, the quality assessment and
//! extraction statistics. Field names serialize in camelCase so the JSON
//! payload matches what storage and query collaborators consume.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patterns::Heuristics;

/// Coarse classification of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// News site or article.
    News,
    /// Blog post.
    Blog,
    /// Shop or product page.
    Ecommerce,
    /// Documentation, guides, references.
    Documentation,
    /// Papers and research.
    Academic,
    /// Forums and Q&A.
    Forum,
    /// Video pages.
    Video,
    /// Social networks.
    Social,
    /// Anything else.
    #[default]
    General,
}

/// Metadata about the page, captured once per extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// Page title (at most 300 chars, `"Untitled"` when nothing plausible).
    pub title: String,

    /// Page description (at most 1000 chars, may be empty).
    pub description: String,

    /// Page URL (empty when the document has no location).
    pub url: String,

    /// Hostname of the page URL.
    pub domain: String,

    /// Language code from `<html lang>` or `content-language`, default `en`.
    pub language: String,

    /// Capture time.
    pub timestamp: DateTime<Utc>,

    /// Page classification.
    pub content_type: ContentType,

    /// Words in the rendered body text.
    pub word_count: usize,

    /// Wall-clock time spent on the whole extraction.
    pub processing_time_ms: u64,
}

/// Ranking weight of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Lists, quotes, cells, text nodes.
    Low,
    /// Paragraphs.
    Medium,
    /// Headings.
    High,
}

impl Importance {
    /// Sort rank, higher first.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Source element category of a chunk.
///
/// Serializes as the lowercase tag name (`"h2"`, `"p"`, `"li"`), or
/// `"text-node"` for chunks produced by the text-node fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ChunkKind {
    /// `h1`..`h6`.
    Heading(u8),
    /// `p`.
    Paragraph,
    /// `blockquote`.
    BlockQuote,
    /// `li`.
    ListItem,
    /// Bare text node found by the fallback extractor.
    TextNode,
    /// Any other element tag.
    Element(String),
}

/// Serialized name of [`ChunkKind::TextNode`].
pub const TEXT_NODE_KIND: &str = "text-node";

impl ChunkKind {
    /// Kind for an element tag name (case-insensitive).
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        if Heuristics::is_heading_tag(&tag) {
            let level = tag.as_bytes()[1] - b'0';
            return Self::Heading(level);
        }
        match tag.as_str() {
            "p" => Self::Paragraph,
            "blockquote" => Self::BlockQuote,
            "li" => Self::ListItem,
            TEXT_NODE_KIND => Self::TextNode,
            _ => Self::Element(tag),
        }
    }

    /// True for `h1`..`h6`.
    #[must_use]
    pub fn is_heading(&self) -> bool {
        matches!(self, Self::Heading(_))
    }

    /// Importance derived from the kind: headings high, paragraphs medium.
    #[must_use]
    pub fn importance(&self) -> Importance {
        match self {
            Self::Heading(_) => Importance::High,
            Self::Paragraph => Importance::Medium,
            _ => Importance::Low,
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heading(level) => write!(f, "h{level}"),
            Self::Paragraph => f.write_str("p"),
            Self::BlockQuote => f.write_str("blockquote"),
            Self::ListItem => f.write_str("li"),
            Self::TextNode => f.write_str(TEXT_NODE_KIND),
            Self::Element(tag) => f.write_str(tag),
        }
    }
}

impl From<ChunkKind> for String {
    fn from(kind: ChunkKind) -> Self {
        kind.to_string()
    }
}

impl From<String> for ChunkKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

/// The atomic unit of extracted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Category of the source element.
    #[serde(rename = "type")]
    pub kind: ChunkKind,

    /// Text content. Whitespace-normalized after cleanup.
    pub content: String,

    /// Nearest contextual heading, or empty.
    pub heading: String,

    /// Position in document traversal; stable tie-break when ranking.
    pub order: usize,

    /// Diagnostic identifier of the source element (`#id`, `.class` or tag).
    pub selector: String,

    /// Ranking weight.
    pub importance: Importance,

    /// Words in `content`, recomputed whenever content changes.
    pub word_count: usize,

    /// Position within the parent when this chunk came from splitting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
}

impl Chunk {
    /// Build a chunk, deriving importance from the kind and counting words.
    #[must_use]
    pub fn new(kind: ChunkKind, content: String, heading: String, order: usize, selector: String) -> Self {
        let importance = kind.importance();
        let word_count = crate::cleanup::word_count(&content);
        Self {
            kind,
            content,
            heading,
            order,
            selector,
            importance,
            word_count,
            chunk_index: None,
        }
    }
}

/// Quality flags over the final chunk sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct QualityFlags {
    /// At least 200 words in total.
    pub is_content_rich: bool,
    /// Average words per chunk within [15, 300].
    pub has_good_chunk_size: bool,
    /// Heading chunks or contextual headings present.
    pub has_structure: bool,
    /// More than three distinct chunk types.
    pub has_variety: bool,
    /// At least one high-importance chunk.
    pub has_high_quality_content: bool,
    /// Content-rich and at least five chunks. Not one of the scored flags.
    pub rag_ready: bool,
}

impl QualityFlags {
    /// The five scored flags, in declaration order.
    #[must_use]
    pub fn scored(&self) -> [bool; 5] {
        [
            self.is_content_rich,
            self.has_good_chunk_size,
            self.has_structure,
            self.has_variety,
            self.has_high_quality_content,
        ]
    }
}

/// Verdict on whether the page is usable for retrieval-augmented answering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagAssessment {
    /// `ragReady` and at least 100 words.
    pub suitable: bool,
    /// Human-readable advice.
    pub recommendation: String,
    /// `min(100, round(totalWords / 10))`.
    pub content_score: u8,
    /// Percentage of scored quality flags that hold.
    pub quality_score: u8,
}

/// How structure was detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureType {
    /// Heading chunks present.
    Headings,
    /// Only contextual headings present.
    Contextual,
    /// Neither.
    #[default]
    Minimal,
}

/// Aggregate statistics and verdict over the final chunk sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessment {
    /// Sum of chunk word counts.
    pub total_words: usize,
    /// Rounded average words per chunk.
    pub average_words_per_chunk: usize,
    /// Quality flags.
    pub quality: QualityFlags,
    /// Suitability verdict.
    pub rag_assessment: RagAssessment,
    /// Distinct chunk types.
    pub variety_score: usize,
    /// Structure detected.
    pub structure_type: StructureType,
}

/// Counts describing how the chunk sequence was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    /// Chunks produced by the primary extractor.
    pub semantic_elements_found: usize,
    /// Chunks produced by the text-node fallback.
    pub fallback_nodes_used: usize,
    /// Chunks dropped by cleanup (never negative).
    pub duplicates_removed: usize,
    /// Distinct chunk types in the final sequence.
    pub variety_score: usize,
    /// Structure detected.
    pub structure_type: StructureType,
}

/// Root output of one extraction invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// False when the pipeline failed.
    pub success: bool,

    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Page metadata (absent on failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMetadata>,

    /// Chunks ranked by importance, then document order.
    pub chunks: Vec<Chunk>,

    /// Sum of chunk word counts.
    pub total_words: usize,

    /// Number of chunks.
    pub total_chunks: usize,

    /// Rounded average words per chunk.
    pub average_words_per_chunk: usize,

    /// Whether the content is suitable for retrieval use.
    pub suitable: bool,

    /// Quality flags (absent on failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityFlags>,

    /// Suitability verdict (absent on failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_assessment: Option<RagAssessment>,

    /// Extraction statistics (absent on failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionStats>,

    /// Time the result was assembled.
    pub timestamp: DateTime<Utc>,
}

impl ExtractionResult {
    /// Structured failure: no chunks, not suitable, with an error message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            metadata: None,
            chunks: Vec::new(),
            total_words: 0,
            total_chunks: 0,
            average_words_per_chunk: 0,
            suitable: false,
            quality: None,
            rag_assessment: None,
            extraction: None,
            timestamp: Utc::now(),
        }
    }
}
