//! Node classification.
//!
//! Predicates that decide whether an element is visible, whether it is
//! structural noise (navigation, ads, consent banners, social widgets) and
//! whether it plausibly carries main content. They are grouped on
//! [`PageClassifier`], which borrows the page, the settings and the heuristic
//! tables, and precomputes the set of elements matched by the noise denylist
//! so ancestor checks are hash lookups instead of repeated selector queries.
//!
//! Every predicate is fail-open: a [`crate::dom::DomError`] while classifying
//! is logged and the node is treated as visible and not noise.

mod content;
mod noise;
mod visibility;

pub use content::{element_selector, ContentSignal};
pub use noise::{is_advertisement_text, NoiseCache, NoiseReason};
pub use visibility::in_extended_window;

use crate::config::Config;
use crate::dom::PageDom;
use crate::patterns::Heuristics;

/// Classification context for one page.
pub struct PageClassifier<'a, D: PageDom> {
    page: &'a D,
    config: &'a Config,
    heuristics: &'a Heuristics,
    noise: NoiseCache<D::Node>,
}

impl<'a, D: PageDom> PageClassifier<'a, D> {
    /// Build a classifier, running every noise rule against the page once.
    pub fn new(page: &'a D, config: &'a Config, heuristics: &'a Heuristics) -> Self {
        let noise = NoiseCache::build(page, &heuristics.noise_rules);
        Self {
            page,
            config,
            heuristics,
            noise,
        }
    }

    /// The page being classified.
    #[must_use]
    pub fn page(&self) -> &'a D {
        self.page
    }

    /// Extraction settings.
    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Heuristic tables.
    #[must_use]
    pub fn heuristics(&self) -> &'a Heuristics {
        self.heuristics
    }

    /// Advertisement check using this classifier's keyword tables.
    #[must_use]
    pub fn is_advertisement_text(&self, text: &str) -> bool {
        is_advertisement_text(text, self.heuristics)
    }
}
