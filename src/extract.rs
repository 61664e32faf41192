//! Extraction orchestrator.
//!
//! Sequences metadata capture, the primary and fallback extractors, cleanup,
//! ranking and quality assessment into one [`ExtractionResult`]. Nothing
//! escapes [`Extractor::extract`]: errors and panics become failure results.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::Utc;

use crate::cleanup::clean_chunks;
use crate::config::Config;
use crate::dom::PageDom;
use crate::error::{Error, Result};
use crate::extractor::{extract_semantic, extract_text_nodes};
use crate::metadata::extract_metadata;
use crate::patterns::{ContentTypeDetector, Heuristics};
use crate::quality;
use crate::result::{Chunk, ExtractionResult, ExtractionStats};
use crate::selector::PageClassifier;

/// A configured extraction pipeline, reusable across pages.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: Config,
    heuristics: Heuristics,
    detector: ContentTypeDetector,
}

impl Extractor {
    /// Validate the settings and compile the heuristic tables.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for inconsistent settings and
    /// `Error::InvalidPattern` for a content-type rule that does not compile.
    pub fn new(config: Config, heuristics: Heuristics) -> Result<Self> {
        config.validate()?;
        let detector = ContentTypeDetector::new(&heuristics.content_type_rules)?;
        Ok(Self {
            config,
            heuristics,
            detector,
        })
    }

    /// Extraction settings.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Heuristic tables.
    #[must_use]
    pub fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    /// Run the whole pipeline over a page.
    ///
    /// Always returns a result: on failure `success` is false, `error` holds
    /// a message and the chunk sequence is empty.
    pub fn extract<D: PageDom>(&self, page: &D) -> ExtractionResult {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(page))) {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "extraction failed");
                ExtractionResult::failure(e.to_string())
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::warn!(message, "extraction panicked");
                ExtractionResult::failure(Error::Extraction(message).to_string())
            }
        }
    }

    fn run<D: PageDom>(&self, page: &D) -> Result<ExtractionResult> {
        let start = Instant::now();
        if page.body().is_none() {
            return Err(Error::MissingBody);
        }

        let mut metadata = extract_metadata(page, &self.heuristics, &self.detector);
        tracing::debug!(title = %metadata.title, content_type = ?metadata.content_type, "metadata captured");

        let classifier = PageClassifier::new(page, &self.config, &self.heuristics);

        let semantic = extract_semantic(&classifier);
        tracing::debug!(chunks = semantic.len(), "primary extraction finished");

        let fallback = extract_text_nodes(&classifier, &semantic);
        let semantic_elements_found = semantic.len();
        let fallback_nodes_used = fallback.len();

        let mut raw = semantic;
        raw.extend(fallback);
        let raw_count = raw.len();

        let mut chunks = clean_chunks(raw, &self.config, &self.heuristics);
        tracing::debug!(before = raw_count, after = chunks.len(), "cleanup finished");
        rank(&mut chunks);

        let assessment = quality::assess(&chunks);
        let extraction = ExtractionStats {
            semantic_elements_found,
            fallback_nodes_used,
            duplicates_removed: raw_count.saturating_sub(chunks.len()),
            variety_score: assessment.variety_score,
            structure_type: assessment.structure_type,
        };

        metadata.processing_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            chunks = chunks.len(),
            words = assessment.total_words,
            quality_score = assessment.rag_assessment.quality_score,
            content_score = assessment.rag_assessment.content_score,
            structure = ?assessment.structure_type,
            variety = assessment.variety_score,
            elapsed_ms = metadata.processing_time_ms,
            "extraction complete"
        );

        Ok(ExtractionResult {
            success: true,
            error: None,
            metadata: Some(metadata),
            total_chunks: chunks.len(),
            total_words: assessment.total_words,
            average_words_per_chunk: assessment.average_words_per_chunk,
            suitable: assessment.rag_assessment.suitable,
            quality: Some(assessment.quality),
            rag_assessment: Some(assessment.rag_assessment),
            extraction: Some(extraction),
            timestamp: Utc::now(),
            chunks,
        })
    }
}

/// Stable sort by importance (high first), then document order.
pub fn rank(chunks: &mut [Chunk]) {
    chunks.sort_by(|a, b| {
        b.importance
            .rank()
            .cmp(&a.importance.rank())
            .then(a.order.cmp(&b.order))
    });
}
