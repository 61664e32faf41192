//! Error types for page-harvest.
//!
//! Extraction itself never returns these to callers of [`crate::extract`]:
//! the orchestrator folds them into a failure [`crate::ExtractionResult`].
//! They surface from constructors (`Extractor::new`, `Heuristics::from_json`)
//! and from the lower-level building blocks.

/// Error type for extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration values are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A heuristic regex pattern failed to compile.
    #[error("Invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Settings or heuristic tables JSON could not be parsed.
    #[error("Settings could not be parsed: {0}")]
    Json(#[from] serde_json::Error),

    /// The document has no body element to extract from.
    #[error("Document has no body element")]
    MissingBody,

    /// The document capability interface reported an error.
    #[error(transparent)]
    Dom(#[from] DomError),

    /// General extraction failure.
    #[error("Extraction failed: {0}")]
    Extraction(String),
}

/// Errors reported by a [`crate::dom::PageDom`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// A CSS selector could not be parsed.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// The node handle no longer refers to a node in the document.
    #[error("Node is not attached to the document")]
    DetachedNode,
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
