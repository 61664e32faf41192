//! Text-node fallback for pages the primary extractor reads thinly.
//!
//! Pages built from bare `<div>`s and text rarely match semantic selectors.
//! When the primary chunks add up to fewer than `fallback_word_threshold`
//! words, the text nodes under the best-guess container are walked directly.

use std::collections::HashSet;

use crate::cleanup::char_prefix;
use crate::dom::PageDom;
use crate::result::{Chunk, ChunkKind};
use crate::selector::{element_selector, PageClassifier};

use super::heading::find_contextual_heading;

/// Shortest trimmed text node considered (chars).
const MIN_TEXT_NODE_LEN: usize = 25;

/// Prefix length used to detect overlap with existing chunks.
const OVERLAP_PROBE_LEN: usize = 50;

/// Prefix length used to deduplicate text nodes against each other.
const DEDUP_KEY_LEN: usize = 100;

/// True when the fallback should run for the given primary chunks.
pub fn needs_fallback(existing: &[Chunk], threshold: usize) -> bool {
    existing.iter().map(|c| c.word_count).sum::<usize>() < threshold
}

/// Extract chunks from raw text nodes.
///
/// Returns nothing when the fallback is disabled or `existing` already holds
/// enough words. Accepted chunks are of kind [`ChunkKind::TextNode`] with low
/// importance, and their `order` continues after `existing`.
pub fn extract_text_nodes<D: PageDom>(classifier: &PageClassifier<'_, D>, existing: &[Chunk]) -> Vec<Chunk> {
    let config = classifier.config();
    if !config.enable_text_node_fallback || !needs_fallback(existing, config.fallback_word_threshold) {
        return Vec::new();
    }

    let page = classifier.page();
    let Some(container) = classifier.first_container(&classifier.heuristics().fallback_roots) else {
        return Vec::new();
    };

    let next_order = existing.iter().map(|c| c.order + 1).max().unwrap_or(0);
    let mut seen: HashSet<String> = HashSet::new();
    let mut chunks = Vec::new();

    for node in page.text_nodes(container) {
        if chunks.len() >= config.fallback_max_chunks {
            break;
        }

        let text = node.text.trim();
        if text.chars().count() < MIN_TEXT_NODE_LEN {
            continue;
        }
        if !classifier.is_visible(node.parent) || classifier.is_noise(node.parent) {
            continue;
        }
        if classifier.is_advertisement_text(text) {
            continue;
        }

        let probe = char_prefix(text, OVERLAP_PROBE_LEN);
        if existing.iter().any(|c| c.content.contains(probe)) {
            continue;
        }
        if !seen.insert(char_prefix(text, DEDUP_KEY_LEN).to_string()) {
            continue;
        }

        chunks.push(Chunk::new(
            ChunkKind::TextNode,
            text.to_string(),
            find_contextual_heading(classifier, node.parent),
            next_order + chunks.len(),
            element_selector(page, node.parent),
        ));
    }

    tracing::debug!(chunks = chunks.len(), "text-node fallback finished");
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dom::HtmlPage;
    use crate::patterns::Heuristics;
    use crate::result::Importance;

    fn run(html: &str, config: &Config, existing: &[Chunk]) -> Vec<Chunk> {
        let page = HtmlPage::parse(html);
        let heuristics = Heuristics::default();
        let classifier = PageClassifier::new(&page, config, &heuristics);
        extract_text_nodes(&classifier, existing)
    }

    fn chunk(text: &str, order: usize) -> Chunk {
        Chunk::new(ChunkKind::Paragraph, text.to_string(), String::new(), order, "p".to_string())
    }

    const PAGE: &str = "<div>\
        <span>The first loose text node on this page is here.</span>\
        <span>Short one.</span>\
        <span>A second loose text node with different content.</span>\
        <span>The first loose text node on this page is here.</span>\
        </div>";

    #[test]
    fn test_walks_text_nodes() {
        let chunks = run(PAGE, &Config::default(), &[]);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.kind == ChunkKind::TextNode));
        assert!(chunks.iter().all(|c| c.importance == Importance::Low));
        assert_eq!(chunks[0].order, 0);
        assert_eq!(chunks[1].order, 1);
        assert_eq!(chunks[0].word_count, 10);
    }

    #[test]
    fn test_skips_text_already_extracted() {
        let existing = vec![chunk(
            "Intro. The first loose text node on this page is here. More words follow.",
            4,
        )];
        let chunks = run(PAGE, &Config::default(), &existing);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.starts_with("A second"));
        assert_eq!(chunks[0].order, 5);
    }

    #[test]
    fn test_not_needed_when_primary_is_rich() {
        let rich = vec![chunk(&"word ".repeat(150), 0)];
        assert!(!needs_fallback(&rich, 150));
        assert!(run(PAGE, &Config::default(), &rich).is_empty());
    }

    #[test]
    fn test_disabled() {
        let config = Config {
            enable_text_node_fallback: false,
            ..Config::default()
        };
        assert!(run(PAGE, &config, &[]).is_empty());
    }

    #[test]
    fn test_cap() {
        let config = Config {
            fallback_max_chunks: 1,
            ..Config::default()
        };
        assert_eq!(run(PAGE, &config, &[]).len(), 1);
    }

    #[test]
    fn test_noise_parent_rejected() {
        let html = "<div><footer><span>Footer text long enough to be considered.</span></footer></div>";
        assert!(run(html, &Config::default(), &[]).is_empty());
    }
}
