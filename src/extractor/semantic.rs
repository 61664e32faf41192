//! Primary extraction over semantic containers.

use crate::dom::PageDom;
use crate::result::{Chunk, ChunkKind};
use crate::selector::{element_selector, PageClassifier};

use super::heading::find_contextual_heading;

/// Candidate elements for the primary extractor, in document order.
///
/// The root is the first matching content container (or the body). Inside
/// it, the first priority group that matches anything is used exclusively;
/// when none does, the generic selector list is used as one query.
pub fn candidate_elements<D: PageDom>(classifier: &PageClassifier<'_, D>) -> Vec<D::Node> {
    let page = classifier.page();
    let heuristics = classifier.heuristics();
    let Some(root) = classifier.first_container(&heuristics.content_roots) else {
        return Vec::new();
    };

    for group in &heuristics.priority_groups {
        match page.select_all(Some(root), group) {
            Ok(found) if !found.is_empty() => {
                tracing::debug!(%group, candidates = found.len(), "priority group matched");
                return found;
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(%group, error = %err, "skipping priority group"),
        }
    }

    let generic = heuristics.generic_selectors.join(", ");
    match page.select_all(Some(root), &generic) {
        Ok(found) => {
            tracing::debug!(candidates = found.len(), "generic selectors used");
            found
        }
        Err(err) => {
            tracing::warn!(error = %err, "generic selectors failed");
            Vec::new()
        }
    }
}

/// Run the primary extractor.
///
/// Each candidate must be visible, qualify as a content element and carry
/// trimmed text of at least `min_text_length` chars that is not advertising.
/// A candidate whose text contains, or is contained in, an already accepted
/// chunk is dropped. `order` is the candidate's position in the candidate
/// list.
pub fn extract_semantic<D: PageDom>(classifier: &PageClassifier<'_, D>) -> Vec<Chunk> {
    let page = classifier.page();
    let config = classifier.config();
    let mut chunks: Vec<Chunk> = Vec::new();

    for (order, node) in candidate_elements(classifier).into_iter().enumerate() {
        if !classifier.is_visible(node) || !classifier.is_content_element(node) {
            continue;
        }

        let text = page.rendered_text(node);
        let text = text.trim();
        if text.is_empty() || text.chars().count() < config.min_text_length {
            continue;
        }
        if classifier.is_advertisement_text(text) {
            continue;
        }
        if chunks
            .iter()
            .any(|c| c.content.contains(text) || text.contains(c.content.as_str()))
        {
            continue;
        }

        let tag = page.tag_name(node).unwrap_or_else(|| "div".to_string());
        chunks.push(Chunk::new(
            ChunkKind::from_tag(&tag),
            text.to_string(),
            find_contextual_heading(classifier, node),
            order,
            element_selector(page, node),
        ));
    }

    tracing::debug!(chunks = chunks.len(), "primary extraction finished");
    chunks
}
