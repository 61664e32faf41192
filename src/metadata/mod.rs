//! Page metadata capture.
//!
//! Title, description and language come from prioritized source lists; the
//! first source yielding a plausible value wins. URL and domain come from the
//! page location, and the content type from [`ContentTypeDetector`].

use chrono::Utc;

use crate::dom::PageDom;
use crate::patterns::{ContentTypeDetector, Heuristics};
use crate::result::PageMetadata;

/// Title used when no source yields a plausible one.
pub const UNTITLED: &str = "Untitled";

/// Language used when the page declares none.
pub const DEFAULT_LANGUAGE: &str = "en";

const MAX_TITLE_CHARS: usize = 300;
const MIN_TITLE_CHARS: usize = 4;
const MAX_DESCRIPTION_CHARS: usize = 1000;
const MIN_DESCRIPTION_CHARS: usize = 11;

/// `content` of the first meta tag matching `selector`.
fn meta_content<D: PageDom>(page: &D, selector: &str) -> Option<String> {
    match page.select_first(None, selector) {
        Ok(node) => node.and_then(|n| page.attr(n, "content")),
        Err(e) => {
            tracing::warn!(selector, error = %e, "metadata selector failed");
            None
        }
    }
}

/// Rendered text of the first element matching `selector`.
fn element_text<D: PageDom>(page: &D, selector: &str) -> Option<String> {
    match page.select_first(None, selector) {
        Ok(node) => node.map(|n| page.rendered_text(n)),
        Err(e) => {
            tracing::warn!(selector, error = %e, "metadata selector failed");
            None
        }
    }
}

/// First trimmed candidate with at least `min_chars` chars, cut to `max_chars`.
fn first_plausible(candidates: impl IntoIterator<Item = Option<String>>, min_chars: usize, max_chars: usize) -> Option<String> {
    candidates.into_iter().flatten().find_map(|value| {
        let value = value.trim();
        (value.chars().count() >= min_chars).then(|| value.chars().take(max_chars).collect())
    })
}

/// Page title from Open Graph, Twitter card, `<title>` or the first `<h1>`.
pub fn extract_title<D: PageDom>(page: &D) -> String {
    let sources = [
        meta_content(page, r#"meta[property="og:title"]"#),
        meta_content(page, r#"meta[name="twitter:title"]"#),
        element_text(page, "title"),
        element_text(page, "h1"),
    ];
    first_plausible(sources, MIN_TITLE_CHARS, MAX_TITLE_CHARS).unwrap_or_else(|| UNTITLED.to_string())
}

/// Page description from meta tags, or the first content paragraph.
pub fn extract_description<D: PageDom>(page: &D, heuristics: &Heuristics) -> String {
    let sources = [
        meta_content(page, r#"meta[name="description"]"#),
        meta_content(page, r#"meta[property="og:description"]"#),
        meta_content(page, r#"meta[name="twitter:description"]"#),
        element_text(page, &heuristics.description_fallback),
    ];
    first_plausible(sources, MIN_DESCRIPTION_CHARS, MAX_DESCRIPTION_CHARS).unwrap_or_default()
}

/// Declared language: `<html lang>`, then a `content-language` meta tag.
pub fn extract_language<D: PageDom>(page: &D) -> String {
    let from_html = page
        .document_element()
        .and_then(|html| page.attr(html, "lang"))
        .filter(|lang| !lang.trim().is_empty());
    if let Some(lang) = from_html {
        return lang.trim().to_string();
    }

    // http-equiv values are matched case-insensitively
    let metas = page.select_all(None, "meta[http-equiv]").unwrap_or_default();
    metas
        .into_iter()
        .find(|&meta| {
            page.attr(meta, "http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-language"))
        })
        .and_then(|meta| page.attr(meta, "content"))
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Capture metadata for a page. `processing_time_ms` is left at zero for the
/// caller to fill in once extraction finishes.
pub fn extract_metadata<D: PageDom>(page: &D, heuristics: &Heuristics, detector: &ContentTypeDetector) -> PageMetadata {
    let (url, domain) = page.location().map_or_else(Default::default, |location| {
        (
            location.as_str().to_string(),
            location.host_str().unwrap_or_default().to_string(),
        )
    });

    let title = extract_title(page);
    let content_type = detector.detect(&url, &title, &domain);
    let word_count = page
        .body()
        .map_or(0, |body| page.rendered_text(body).split_whitespace().count());

    PageMetadata {
        description: extract_description(page, heuristics),
        language: extract_language(page),
        timestamp: Utc::now(),
        content_type,
        word_count,
        processing_time_ms: 0,
        title,
        url,
        domain,
    }
}
