//! Heuristic tables and compiled patterns for content extraction.
//!
//! Every denylist, keyword list and selector group the pipeline consults lives
//! in [`Heuristics`], which is plain data: it can be tuned in code or loaded
//! from JSON without touching extraction logic. Text-cleaning regexes that are
//! not meant to be tuned are compiled once with `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::result::ContentType;

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Matches runs of whitespace for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex")
});

/// Matches a blank line (paragraph boundary) in rendered text.
pub static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*\n").expect("PARAGRAPH_BREAK regex")
});

/// Matches heading tag names `h1`..`h6`.
pub static HEADING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^h[1-6]$").expect("HEADING_TAG regex")
});

// =============================================================================
// Heuristic Tables
// =============================================================================

/// Why a noise selector exists. Diagnostic only; every category rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoiseCategory {
    /// Elements that never carry readable text (script, style, meta).
    NonContent,
    /// Site navigation, menus, sidebars, headers and footers.
    Navigation,
    /// Elements hidden through attributes or inline style.
    Hidden,
    /// Cookie, GDPR and privacy consent UI.
    Consent,
    /// Advertising slots.
    Advertising,
    /// Banners, promotions and affiliate blocks.
    Promotion,
    /// Widgets and related-content rails.
    Widget,
    /// Social sharing and follow buttons, embedded social timelines.
    Social,
    /// Comment threads, replies, votes and ratings.
    Comments,
    /// Third-party iframes (comment systems, ad networks, trackers).
    Embed,
    /// Newsletter and signup forms.
    Signup,
    /// Breadcrumbs and pagination.
    Pagination,
}

/// A CSS selector that marks a subtree as noise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseRule {
    /// Selector matched against the element and each of its ancestors.
    pub selector: String,
    /// Reason for the rule.
    pub category: NoiseCategory,
}

/// Maps URL/title/domain patterns to a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeRule {
    /// Classification produced when the rule matches.
    pub content_type: ContentType,
    /// Regex tested against the lowercased hostname.
    pub domain_pattern: String,
    /// Regex tested against the lowercased URL and title.
    pub content_pattern: String,
}

/// Size below which an element is treated as a decorative widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetThreshold {
    /// Maximum width in CSS px.
    pub max_width: f64,
    /// Maximum height in CSS px.
    pub max_height: f64,
    /// Maximum area in CSS px².
    pub max_area: f64,
}

/// All tunable heuristic tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Heuristics {
    /// Structural and advertising denylist.
    pub noise_rules: Vec<NoiseRule>,
    /// Attributes inspected for ad markers on the element itself.
    pub ad_marker_attributes: Vec<String>,
    /// Substrings that flag an attribute value as advertising.
    pub ad_markers: Vec<String>,
    /// Phrases typical of advertising copy.
    pub ad_keywords: Vec<String>,
    /// Words that make long keyword-bearing text count as an ad.
    pub call_to_action_words: Vec<String>,
    /// Keyword-bearing text shorter than this (chars) is an ad.
    pub short_ad_text_len: usize,
    /// Text shorter than this (chars) is never classified as an ad.
    pub min_ad_text_len: usize,
    /// Tags always accepted as content elements.
    pub content_tags: Vec<String>,
    /// Class substrings that mark content elements.
    pub content_class_hints: Vec<String>,
    /// Tags exempt from the text-density floor.
    pub density_exempt_tags: Vec<String>,
    /// Root content container selectors, first match wins.
    pub content_roots: Vec<String>,
    /// Prioritized selector groups tried inside the root container.
    pub priority_groups: Vec<String>,
    /// Broad selectors used when no priority group matches.
    pub generic_selectors: Vec<String>,
    /// Containers for the text-node fallback, first match wins.
    pub fallback_roots: Vec<String>,
    /// Selector whose first match supplies a description of last resort.
    pub description_fallback: String,
    /// Content-type classification rules, first match wins.
    pub content_type_rules: Vec<ContentTypeRule>,
    /// Decorative widget size threshold.
    pub small_widget: WidgetThreshold,
    /// Pixels above the viewport top still counted as visible.
    pub above_fold_allowance: f64,
    /// Preceding siblings and ancestor levels searched for a heading.
    pub heading_search_depth: usize,
    /// Shortest plausible contextual heading (chars).
    pub min_heading_len: usize,
    /// Longest plausible contextual heading (chars).
    pub max_heading_len: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn rules<'a>(category: NoiseCategory, selectors: &'a [&str]) -> impl Iterator<Item = NoiseRule> + 'a {
    selectors.iter().map(move |s| NoiseRule {
        selector: (*s).to_string(),
        category,
    })
}

fn default_noise_rules() -> Vec<NoiseRule> {
    use NoiseCategory::{
        Advertising, Comments, Consent, Embed, Hidden, Navigation, NonContent, Pagination,
        Promotion, Signup, Social, Widget,
    };

    let mut out = Vec::new();
    out.extend(rules(NonContent, &["script", "style", "noscript", "link", "meta"]));
    out.extend(rules(
        Navigation,
        &[
            "nav",
            r#"header[role="banner"]"#,
            "footer",
            "aside",
            r#"form[role="search"]"#,
            ".navbar",
            ".menu",
            ".sidebar",
            r#"[class*="sidebar"]"#,
        ],
    ));
    out.extend(rules(
        Hidden,
        &[
            r#"[aria-hidden="true"]"#,
            r#"[style*="display: none"]"#,
            r#"[style*="visibility: hidden"]"#,
        ],
    ));
    out.extend(rules(
        Consent,
        &[
            r#"[class*="cookie"]"#,
            r#"[class*="gdpr"]"#,
            r#"[class*="privacy"]"#,
            r#"[class*="consent"]"#,
            r#"[id*="cookie"]"#,
            r#"[id*="gdpr"]"#,
            r#"[id*="privacy"]"#,
            r#"[id*="consent"]"#,
        ],
    ));
    out.extend(rules(
        Advertising,
        &[
            r#"[class*="ad-"]"#,
            r#"[class*="ads"]"#,
            r#"[class*="advertisement"]"#,
            r#"[class*="sponsor"]"#,
            r#"[id*="ad-"]"#,
            r#"[id*="ads"]"#,
            r#"[id*="advertisement"]"#,
            r#"[id*="sponsor"]"#,
            "[data-ad]",
            "[data-ads]",
            "[data-advertisement]",
            "[data-sponsor]",
            ".ad",
            ".ads",
            "#ad",
            "#ads",
        ],
    ));
    out.extend(rules(
        Promotion,
        &[r#"[class*="banner"]"#, r#"[class*="promo"]"#, r#"[class*="affiliate"]"#],
    ));
    out.extend(rules(Widget, &[r#"[class*="widget"]"#, r#"[class*="related"]"#]));
    out.extend(rules(
        Social,
        &[
            r#"[class*="social"]"#,
            r#"[class*="share"]"#,
            r#"[class*="follow"]"#,
            r#"[class*="subscribe"]"#,
            ".twitter-timeline",
            ".facebook-like",
            ".instagram-media",
        ],
    ));
    out.extend(rules(
        Comments,
        &[
            r#"[class*="comment"]"#,
            r#"[class*="reply"]"#,
            r#"[class*="vote"]"#,
            r#"[class*="rating"]"#,
        ],
    ));
    out.extend(rules(
        Embed,
        &[
            r#"iframe[src*="disqus"]"#,
            r#"iframe[src*="facebook"]"#,
            r#"iframe[src*="twitter"]"#,
            r#"iframe[src*="doubleclick"]"#,
            r#"iframe[src*="googlesyndication"]"#,
            r#"iframe[src*="googletagmanager"]"#,
            r#"iframe[src*="amazon-adsystem"]"#,
            r#"iframe[src*="outbrain"]"#,
            r#"iframe[src*="taboola"]"#,
        ],
    ));
    out.extend(rules(
        Signup,
        &[
            r#"[class*="newsletter"]"#,
            r#"[class*="signup"]"#,
            r#"[class*="subscription"]"#,
        ],
    ));
    out.extend(rules(
        Pagination,
        &[
            r#"[class*="breadcrumb"]"#,
            r#"[class*="pagination"]"#,
            r#"[class*="pager"]"#,
        ],
    ));
    out
}

fn default_content_type_rules() -> Vec<ContentTypeRule> {
    let rule = |content_type, domain: &str, content: &str| ContentTypeRule {
        content_type,
        domain_pattern: domain.to_string(),
        content_pattern: content.to_string(),
    };
    vec![
        rule(
            ContentType::News,
            "news|cnn|bbc|reuters|associated-press|nytimes|guardian|washingtonpost",
            "article|breaking|latest|update|press|report|journalism",
        ),
        rule(
            ContentType::Blog,
            "blog|medium|substack|wordpress|blogspot",
            "blog|post|story|opinion|editorial",
        ),
        rule(
            ContentType::Ecommerce,
            "shop|store|amazon|ebay|etsy|shopify",
            "shop|buy|cart|product|price|store|purchase",
        ),
        rule(
            ContentType::Documentation,
            "docs|documentation|github|readthedocs|wiki",
            "docs|documentation|guide|api|manual|tutorial|reference",
        ),
        rule(
            ContentType::Academic,
            "edu|scholar|research|arxiv|pubmed",
            "research|paper|study|journal|academic|thesis|dissertation",
        ),
        rule(
            ContentType::Forum,
            "reddit|stackoverflow|quora|discourse",
            "forum|discussion|thread|community|qa|question",
        ),
        rule(
            ContentType::Video,
            "youtube|vimeo|twitch|video",
            "watch|video|stream|episode|show",
        ),
        rule(
            ContentType::Social,
            "twitter|facebook|instagram|linkedin|social",
            "social|tweet|post|profile|feed|timeline",
        ),
    ]
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            noise_rules: default_noise_rules(),
            ad_marker_attributes: strings(&["class", "id", "data-testid", "data-component"]),
            ad_markers: strings(&["ad", "sponsor", "promo"]),
            ad_keywords: strings(&[
                "advertisement",
                "sponsored",
                "promoted",
                "affiliate",
                "buy now",
                "shop now",
                "click here",
                "learn more",
                "subscribe",
                "sign up",
                "newsletter",
                "free trial",
                "limited time",
                "special offer",
                "discount",
                "sale",
                "promo code",
                "coupon",
            ]),
            call_to_action_words: strings(&["click", "buy"]),
            short_ad_text_len: 100,
            min_ad_text_len: 10,
            content_tags: strings(&[
                "article", "main", "section", "p", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
            ]),
            content_class_hints: strings(&[
                "content",
                "article",
                "post",
                "text",
                "body",
                "description",
                "summary",
            ]),
            density_exempt_tags: strings(&["p", "h1", "h2", "h3", "h4", "h5", "h6"]),
            content_roots: strings(&[
                "main",
                "article",
                r#"[role="main"]"#,
                ".post-content, .article-content, .content, .entry-content",
                ".post-body, .article-body, .story-body",
            ]),
            priority_groups: strings(&[
                "article p, main p, .content p, .post-content p, \
                 article h1, article h2, article h3, main h1, main h2, main h3",
                "article blockquote, main blockquote, .content blockquote",
                "article li, main li, .content li",
                "article div, main div, .content div",
            ]),
            generic_selectors: strings(&[
                "p", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "li", "pre", "code",
                "figcaption", "td", "th",
            ]),
            fallback_roots: strings(&[
                "main",
                "article",
                ".content, .main-content, .post-content",
            ]),
            description_fallback: "article p, .content p, main p".to_string(),
            content_type_rules: default_content_type_rules(),
            small_widget: WidgetThreshold {
                max_width: 50.0,
                max_height: 50.0,
                max_area: 1000.0,
            },
            above_fold_allowance: 1000.0,
            heading_search_depth: 5,
            min_heading_len: 4,
            max_heading_len: 199,
        }
    }
}

impl Heuristics {
    /// Load heuristic tables from JSON. Omitted tables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` when the JSON does not describe heuristic tables.
    ///
    /// # Example
    ///
    /// ```rust
    /// use page_harvest::Heuristics;
    ///
    /// let heuristics = Heuristics::from_json(r#"{"adKeywords": ["limited offer"]}"#)?;
    /// assert_eq!(heuristics.ad_keywords, vec!["limited offer".to_string()]);
    /// assert!(!heuristics.noise_rules.is_empty());
    /// # Ok::<(), page_harvest::Error>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// True when `tag` is one of `h1`..`h6`.
    #[must_use]
    pub fn is_heading_tag(tag: &str) -> bool {
        HEADING_TAG.is_match(tag)
    }
}

// =============================================================================
// Content Type Detection
// =============================================================================

/// Compiled form of [`ContentTypeRule`]s.
#[derive(Debug, Clone)]
pub struct ContentTypeDetector {
    rules: Vec<(ContentType, Regex, Regex)>,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

impl ContentTypeDetector {
    /// Compile classification rules in priority order.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` for the first rule whose regex does not
    /// compile.
    pub fn new(rules: &[ContentTypeRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                Ok((
                    rule.content_type,
                    compile(&rule.domain_pattern)?,
                    compile(&rule.content_pattern)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Classify a page. A rule matches when its domain pattern matches the
    /// hostname or its content pattern matches the URL or the title.
    #[must_use]
    pub fn detect(&self, url: &str, title: &str, domain: &str) -> ContentType {
        let url = url.to_lowercase();
        let title = title.to_lowercase();
        let domain = domain.to_lowercase();

        self.rules
            .iter()
            .find(|(_, domain_re, content_re)| {
                domain_re.is_match(&domain) || content_re.is_match(&url) || content_re.is_match(&title)
            })
            .map_or(ContentType::General, |(content_type, _, _)| *content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ContentTypeDetector {
        ContentTypeDetector::new(&Heuristics::default().content_type_rules).unwrap()
    }

    #[test]
    fn test_default_tables_are_populated() {
        let h = Heuristics::default();
        assert!(h.noise_rules.iter().any(|r| r.selector == "nav"));
        assert!(h.noise_rules.iter().any(|r| r.category == NoiseCategory::Consent));
        assert_eq!(h.ad_keywords.len(), 18);
        assert_eq!(h.content_roots.first().map(String::as_str), Some("main"));
    }

    #[test]
    fn test_heading_tag() {
        assert!(Heuristics::is_heading_tag("h1"));
        assert!(Heuristics::is_heading_tag("h6"));
        assert!(!Heuristics::is_heading_tag("h7"));
        assert!(!Heuristics::is_heading_tag("header"));
    }

    #[test]
    fn test_detect_by_domain() {
        let d = detector();
        assert_eq!(d.detect("https://www.bbc.co.uk/x", "", "www.bbc.co.uk"), ContentType::News);
        assert_eq!(d.detect("https://arxiv.org/abs/1", "", "arxiv.org"), ContentType::Academic);
    }

    #[test]
    fn test_detect_by_url_or_title() {
        let d = detector();
        assert_eq!(
            d.detect("https://example.org/docs/intro", "Intro", "example.org"),
            ContentType::Documentation
        );
        assert_eq!(
            d.detect("https://example.org/x", "Community Forum", "example.org"),
            ContentType::Forum
        );
    }

    #[test]
    fn test_detect_falls_back_to_general() {
        let d = detector();
        assert_eq!(d.detect("https://example.org/", "Home", "example.org"), ContentType::General);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "blog" hits the blog rule before the social rule's "post"
        let d = detector();
        assert_eq!(
            d.detect("https://example.org/blog/post", "", "example.org"),
            ContentType::Blog
        );
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let rules = vec![ContentTypeRule {
            content_type: ContentType::News,
            domain_pattern: "(unclosed".into(),
            content_pattern: "ok".into(),
        }];
        assert!(matches!(
            ContentTypeDetector::new(&rules),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_heuristics_json_partial_override() {
        let h = Heuristics::from_json(r#"{"shortAdTextLen": 60}"#).unwrap();
        assert_eq!(h.short_ad_text_len, 60);
        assert_eq!(h.min_ad_text_len, 10);
    }
}
