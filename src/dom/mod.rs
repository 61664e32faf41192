//! Document capability interface.
//!
//! The extraction pipeline never talks to a concrete DOM. It reads a page
//! through [`PageDom`], which exposes element tree navigation, selector
//! queries, rendered text, computed style and geometry, and text-node walking.
//! [`HtmlPage`] implements it over `dom_query` with an estimated layout, so the
//! same pipeline runs against static HTML, synthetic test documents or a
//! bridge to a live browser.

mod charset;
mod html;
mod layout;

use std::fmt::Debug;
use std::hash::Hash;

use url::Url;

pub use crate::error::DomError;
pub use charset::{decode_html, sniff_encoding};
pub use html::HtmlPage;

/// CSS `display`, reduced to what visibility checks need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Display {
    /// Block-level box.
    #[default]
    Block,
    /// Inline box.
    Inline,
    /// Not rendered.
    None,
}

/// CSS `visibility`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Painted.
    #[default]
    Visible,
    /// Laid out but not painted (`hidden` or `collapse`).
    Hidden,
}

/// Computed style properties consulted by the visibility classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedStyle {
    /// Computed `display`.
    pub display: Display,
    /// Computed `visibility` (inherited).
    pub visibility: Visibility,
    /// Computed `opacity` of the element itself.
    pub opacity: f64,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            visibility: Visibility::Visible,
            opacity: 1.0,
        }
    }
}

/// Bounding box in CSS px, relative to the viewport top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Distance from the viewport top (negative when scrolled past).
    pub top: f64,
    /// Distance from the viewport left.
    pub left: f64,
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl Rect {
    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Rendered area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Size of the visible window in CSS px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Window width.
    pub width: f64,
    /// Window height.
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// A text node together with the element that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode<N> {
    /// Raw node value (not trimmed).
    pub text: String,
    /// Containing element.
    pub parent: N,
}

/// Read-only view of a rendered page.
///
/// Selector queries follow `querySelectorAll` semantics: results are the
/// descendants of `scope` (or of the whole document when `scope` is `None`)
/// that match, in document order, without duplicates.
pub trait PageDom {
    /// Cheap handle to an element.
    type Node: Copy + Eq + Hash + Debug;

    /// The `<html>` element.
    fn document_element(&self) -> Option<Self::Node>;

    /// The `<body>` element.
    fn body(&self) -> Option<Self::Node>;

    /// Elements matching `selector` under `scope`.
    ///
    /// # Errors
    ///
    /// Returns `DomError::InvalidSelector` when the selector cannot be parsed.
    fn select_all(&self, scope: Option<Self::Node>, selector: &str) -> Result<Vec<Self::Node>, DomError>;

    /// First element matching `selector` under `scope`.
    ///
    /// # Errors
    ///
    /// Returns `DomError::InvalidSelector` when the selector cannot be parsed.
    fn select_first(&self, scope: Option<Self::Node>, selector: &str) -> Result<Option<Self::Node>, DomError> {
        Ok(self.select_all(scope, selector)?.into_iter().next())
    }

    /// Lowercase tag name.
    fn tag_name(&self, node: Self::Node) -> Option<String>;

    /// Attribute value.
    fn attr(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Parent element, `None` at the root.
    fn parent_element(&self, node: Self::Node) -> Option<Self::Node>;

    /// Nearest preceding sibling that is an element.
    fn previous_element_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Rendered text, as `innerText` would report it.
    fn rendered_text(&self, node: Self::Node) -> String;

    /// Length in chars of the serialized inner markup.
    fn markup_len(&self, node: Self::Node) -> usize;

    /// Text nodes under `scope` in document order.
    fn text_nodes(&self, scope: Self::Node) -> Vec<TextNode<Self::Node>>;

    /// Computed style of an element.
    ///
    /// # Errors
    ///
    /// Returns `DomError::DetachedNode` when the node is not laid out.
    fn computed_style(&self, node: Self::Node) -> Result<ComputedStyle, DomError>;

    /// Bounding box of an element.
    ///
    /// # Errors
    ///
    /// Returns `DomError::DetachedNode` when the node is not laid out.
    fn bounding_rect(&self, node: Self::Node) -> Result<Rect, DomError>;

    /// Visible window size.
    fn viewport(&self) -> Viewport;

    /// Page URL, when known.
    fn location(&self) -> Option<&Url>;
}
