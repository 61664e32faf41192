//! Noise detection: denylisted structure, ad markers, tiny widgets and
//! advertising copy.

use std::collections::HashMap;
use std::hash::Hash;

use crate::dom::PageDom;
use crate::patterns::{Heuristics, NoiseCategory, NoiseRule};

use super::PageClassifier;

/// Why an element was classified as noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoiseReason {
    /// The element or an ancestor matched a denylist rule.
    Rule(NoiseCategory),
    /// An attribute of the element contains an ad marker.
    AdMarker {
        /// Attribute name.
        attribute: String,
        /// Marker substring found in its value.
        marker: String,
    },
    /// The element renders smaller than the widget threshold.
    SmallWidget,
}

/// Elements matched by the noise denylist, computed once per page.
#[derive(Debug)]
pub struct NoiseCache<N> {
    matched: HashMap<N, NoiseCategory>,
}

impl<N: Copy + Eq + Hash> NoiseCache<N> {
    /// Run every rule against the page. Rules with unparsable selectors are
    /// skipped.
    pub fn build<D>(page: &D, rules: &[NoiseRule]) -> Self
    where
        D: PageDom<Node = N>,
    {
        let mut matched = HashMap::new();
        for rule in rules {
            match page.select_all(None, &rule.selector) {
                Ok(nodes) => {
                    for node in nodes {
                        matched.entry(node).or_insert(rule.category);
                    }
                }
                Err(err) => {
                    tracing::warn!(selector = %rule.selector, error = %err, "skipping noise rule");
                }
            }
        }
        tracing::trace!(matched = matched.len(), "noise rules applied");
        Self { matched }
    }

    /// Category of the nearest denylisted element among `node` and its
    /// ancestors.
    pub fn category_of<D>(&self, page: &D, node: N) -> Option<NoiseCategory>
    where
        D: PageDom<Node = N>,
    {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(category) = self.matched.get(&n) {
                return Some(*category);
            }
            current = page.parent_element(n);
        }
        None
    }

    /// Number of elements matched directly by a rule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matched.len()
    }

    /// True when no rule matched anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// True when `text` reads like advertising copy: it contains an ad keyword
/// and is either short or carries a call to action.
#[must_use]
pub fn is_advertisement_text(text: &str, heuristics: &Heuristics) -> bool {
    let len = text.chars().count();
    if len < heuristics.min_ad_text_len {
        return false;
    }
    let lower = text.to_lowercase();
    let contains_any = |words: &[String]| words.iter().any(|w| lower.contains(&w.to_lowercase()));

    contains_any(&heuristics.ad_keywords)
        && (len < heuristics.short_ad_text_len || contains_any(&heuristics.call_to_action_words))
}

impl<D: PageDom> PageClassifier<'_, D> {
    /// True when the element is structural or advertising noise.
    pub fn is_noise(&self, node: D::Node) -> bool {
        self.noise_reason(node).is_some()
    }

    /// Reason the element is noise, if it is.
    pub fn noise_reason(&self, node: D::Node) -> Option<NoiseReason> {
        if let Some(category) = self.noise.category_of(self.page, node) {
            return Some(NoiseReason::Rule(category));
        }

        for attribute in &self.heuristics.ad_marker_attributes {
            let Some(value) = self.page.attr(node, attribute) else {
                continue;
            };
            let value = value.to_lowercase();
            if let Some(marker) = self
                .heuristics
                .ad_markers
                .iter()
                .find(|m| value.contains(m.as_str()))
            {
                return Some(NoiseReason::AdMarker {
                    attribute: attribute.clone(),
                    marker: marker.clone(),
                });
            }
        }

        let rect = match self.page.bounding_rect(node) {
            Ok(rect) => rect,
            Err(err) => {
                tracing::warn!(?node, error = %err, "noise check failed, treating as content");
                return None;
            }
        };
        let widget = &self.heuristics.small_widget;
        if rect.width < widget.max_width && rect.height < widget.max_height && rect.area() < widget.max_area {
            return Some(NoiseReason::SmallWidget);
        }
        None
    }

    /// Rendered text length over serialized markup length; 0 for empty
    /// markup.
    pub fn text_density(&self, node: D::Node) -> f64 {
        let markup = self.page.markup_len(node);
        if markup == 0 {
            return 0.0;
        }
        let text = self.page.rendered_text(node).chars().count();
        text as f64 / markup as f64
    }
}
