//! Content element predicate and container lookup.

use crate::dom::PageDom;

use super::PageClassifier;

/// What qualified an element as content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSignal {
    /// Its tag is a known content tag.
    Tag,
    /// Its class attribute contains a content hint.
    ClassHint,
    /// Nothing disqualified it.
    Default,
}

/// Diagnostic identifier for an element: `#id`, `.first-class` or tag name.
pub fn element_selector<D: PageDom>(page: &D, node: D::Node) -> String {
    if let Some(id) = page.attr(node, "id").filter(|id| !id.is_empty()) {
        return format!("#{id}");
    }
    if let Some(class) = page
        .attr(node, "class")
        .and_then(|c| c.split_whitespace().next().map(str::to_string))
    {
        return format!(".{class}");
    }
    page.tag_name(node).unwrap_or_default()
}

impl<D: PageDom> PageClassifier<'_, D> {
    /// True when the element may hold main content: it is not noise and,
    /// unless it is a paragraph or heading, its text density clears the
    /// configured floor.
    pub fn is_content_element(&self, node: D::Node) -> bool {
        self.content_signal(node).is_some()
    }

    /// Signal that qualified the element, or `None` when it is rejected.
    pub fn content_signal(&self, node: D::Node) -> Option<ContentSignal> {
        if self.is_noise(node) {
            return None;
        }

        let tag = self.page.tag_name(node).unwrap_or_default();
        let heuristics = self.heuristics;
        if !heuristics.density_exempt_tags.contains(&tag)
            && self.text_density(node) < self.config.content_density_threshold
        {
            return None;
        }

        if heuristics.content_tags.contains(&tag) {
            return Some(ContentSignal::Tag);
        }
        let class = self.page.attr(node, "class").unwrap_or_default().to_lowercase();
        if heuristics
            .content_class_hints
            .iter()
            .any(|hint| class.contains(hint.as_str()))
        {
            return Some(ContentSignal::ClassHint);
        }
        Some(ContentSignal::Default)
    }

    /// First element matched by the first selector in `selectors` that
    /// matches anything, otherwise the body.
    pub fn first_container(&self, selectors: &[String]) -> Option<D::Node> {
        for selector in selectors {
            match self.page.select_first(None, selector) {
                Ok(Some(node)) => return Some(node),
                Ok(None) => {}
                Err(err) => tracing::warn!(%selector, error = %err, "skipping container selector"),
            }
        }
        self.page.body()
    }
}
