//! # page-harvest
//!
//! Heuristic main-content extraction and chunk-quality assessment for
//! retrieval-augmented answering over web pages.
//!
//! The pipeline reads a rendered page through the [`dom::PageDom`]
//! capability interface, separates main content from noise (navigation, ads,
//! consent banners, social widgets), segments it into chunks with heading
//! context and importance, deduplicates and bounds them, and decides whether
//! the result is worth storing for retrieval.
//!
//! ## Quick Start
//!
//! ```rust
//! let html = r#"<html><head><title>Field notes</title></head><body><main>
//!   <h1>Notes from the field this week</h1>
//!   <p>The first paragraph of the article carries most of the words.</p>
//! </main></body></html>"#;
//!
//! let result = page_harvest::extract_html(html, Some("https://example.com/notes"));
//! assert!(result.success);
//! for chunk in &result.chunks {
//!     println!("[{}] {}", chunk.kind, chunk.content);
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`dom`]: capability interface and the `dom_query`-backed [`HtmlPage`]
//! - [`selector`]: visibility, noise and content classification
//! - [`extractor`]: primary and text-node fallback extractors
//! - [`cleanup`]: normalization, splitting and deduplication
//! - [`quality`]: quality flags, scores and the suitability verdict
//! - [`metadata`]: title, description, language and content type
//! - [`rag`]: storage and query collaborators for retrieval use

mod config;
mod error;
mod extract;
mod patterns;
mod result;

/// Document capability interface and headless HTML implementation.
pub mod dom;

/// Node classification predicates.
pub mod selector;

/// Chunk extractors.
pub mod extractor;

/// Chunk normalization, splitting and deduplication.
pub mod cleanup;

/// Quality assessment.
pub mod quality;

/// Page metadata capture.
pub mod metadata;

/// Retrieval collaborators: storage and query pipelines.
pub mod rag;

pub use config::Config;
pub use dom::{HtmlPage, PageDom};
pub use error::{DomError, Error, Result};
pub use extract::{rank, Extractor};
pub use patterns::{
    ContentTypeDetector, ContentTypeRule, Heuristics, NoiseCategory, NoiseRule, WidgetThreshold,
};
pub use result::{
    Chunk, ChunkKind, ContentType, ExtractionResult, ExtractionStats, Importance, PageMetadata,
    QualityAssessment, QualityFlags, RagAssessment, StructureType, TEXT_NODE_KIND,
};

/// Extract chunks from a page with default settings and heuristics.
///
/// # Example
///
/// ```rust
/// use page_harvest::{extract, HtmlPage};
///
/// let page = HtmlPage::parse("<html><body><p>Too short.</p></body></html>");
/// let result = extract(&page);
/// assert!(result.success);
/// assert!(!result.suitable);
/// ```
pub fn extract<D: PageDom>(page: &D) -> ExtractionResult {
    match Extractor::new(Config::default(), Heuristics::default()) {
        Ok(extractor) => extractor.extract(page),
        Err(e) => ExtractionResult::failure(e.to_string()),
    }
}

/// Parse an HTML string and extract it with default settings.
///
/// `url` becomes the page location; an unparsable URL is ignored with a
/// warning.
pub fn extract_html(html: &str, url: Option<&str>) -> ExtractionResult {
    let mut page = HtmlPage::parse(html);
    if let Some(raw) = url {
        match url::Url::parse(raw) {
            Ok(location) => page = page.with_url(location),
            Err(e) => tracing::warn!(url = raw, error = %e, "ignoring unparsable page url"),
        }
    }
    extract(&page)
}
