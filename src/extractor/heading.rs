//! Contextual heading lookup.

use crate::dom::PageDom;
use crate::patterns::Heuristics;
use crate::selector::PageClassifier;

const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";

/// Nearest heading that gives context to `node`, or an empty string.
///
/// Up to `heading_search_depth` preceding element siblings are checked for a
/// heading tag first. Failing that, each of as many ancestor levels is
/// searched for a visible descendant heading, nearest ancestor first. Only
/// headings whose trimmed text length is plausible are returned.
pub fn find_contextual_heading<D: PageDom>(classifier: &PageClassifier<'_, D>, node: D::Node) -> String {
    let page = classifier.page();
    let heuristics = classifier.heuristics();
    let plausible = |text: &str| {
        let len = text.chars().count();
        (heuristics.min_heading_len..=heuristics.max_heading_len).contains(&len)
    };

    let mut current = node;
    for _ in 0..heuristics.heading_search_depth {
        let Some(sibling) = page.previous_element_sibling(current) else {
            break;
        };
        current = sibling;
        if page
            .tag_name(sibling)
            .is_some_and(|tag| Heuristics::is_heading_tag(&tag))
        {
            let text = page.rendered_text(sibling);
            let text = text.trim();
            if plausible(text) {
                return text.to_string();
            }
        }
    }

    let mut ancestor = page.parent_element(node);
    for _ in 0..heuristics.heading_search_depth {
        let Some(scope) = ancestor else {
            break;
        };
        match page.select_all(Some(scope), HEADING_SELECTOR) {
            Ok(headings) => {
                for heading in headings {
                    if !classifier.is_visible(heading) {
                        continue;
                    }
                    let text = page.rendered_text(heading);
                    let text = text.trim();
                    if plausible(text) {
                        return text.to_string();
                    }
                }
            }
            Err(err) => tracing::warn!(error = %err, "heading lookup failed"),
        }
        ancestor = page.parent_element(scope);
    }

    String::new()
}
