//! [`PageDom`] over a parsed HTML document.

use std::collections::HashMap;

use dom_query::{Document, Matcher, NodeId, NodeRef, Selection};
use url::Url;

use super::layout::{self, NodeBox};
use super::{ComputedStyle, DomError, PageDom, Rect, TextNode, Viewport};

/// A static HTML page with an estimated layout.
///
/// Node handles are `dom_query` node ids; they stay valid for the lifetime
/// of the page because the tree is never mutated after parsing.
pub struct HtmlPage {
    document: Document,
    location: Option<Url>,
    viewport: Viewport,
    layout: HashMap<NodeId, NodeBox>,
}

impl HtmlPage {
    /// Parse an HTML string with the default viewport.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let document = Document::from(html);
        let viewport = Viewport::default();
        let layout = Self::layout(&document, viewport);
        Self {
            document,
            location: None,
            viewport,
            layout,
        }
    }

    /// Parse raw bytes, detecting the character encoding first.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::parse(&super::decode_html(bytes))
    }

    /// Parse an HTML string served from `url`.
    #[must_use]
    pub fn parse_with_url(html: &str, url: Url) -> Self {
        Self::parse(html).with_url(url)
    }

    /// Attach the page address.
    #[must_use]
    pub fn with_url(mut self, url: Url) -> Self {
        self.location = Some(url);
        self
    }

    /// Lay the page out again for a different window size.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self.layout = Self::layout(&self.document, viewport);
        self
    }

    /// The underlying document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn layout(document: &Document, viewport: Viewport) -> HashMap<NodeId, NodeBox> {
        let html = document.select("html");
        match html.nodes().first() {
            Some(root) => layout::estimate(root, viewport),
            None => HashMap::new(),
        }
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.document.tree.get(&id)
    }

    fn first_element(&self, selector: &str) -> Option<NodeId> {
        self.document.select(selector).nodes().first().map(|n| n.id)
    }

    fn node_box(&self, id: NodeId) -> Result<&NodeBox, DomError> {
        self.layout.get(&id).ok_or(DomError::DetachedNode)
    }
}

impl PageDom for HtmlPage {
    type Node = NodeId;

    fn document_element(&self) -> Option<NodeId> {
        self.first_element("html")
    }

    fn body(&self) -> Option<NodeId> {
        self.first_element("body")
    }

    fn select_all(&self, scope: Option<NodeId>, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let matcher =
            Matcher::new(selector).map_err(|_| DomError::InvalidSelector(selector.to_string()))?;
        let found = match scope {
            Some(id) => {
                let node = self.node(id).ok_or(DomError::DetachedNode)?;
                Selection::from(node).select_matcher(&matcher)
            }
            None => self.document.select_matcher(&matcher),
        };
        Ok(found.nodes().iter().map(|n| n.id).collect())
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        let node = self.node(node)?;
        if !node.is_element() {
            return None;
        }
        node.node_name().map(|name| name.to_ascii_lowercase())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node)?.attr(name).map(|value| value.to_string())
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?
            .parent()
            .filter(NodeRef::is_element)
            .map(|parent| parent.id)
    }

    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let mut sibling = self.node(node)?.prev_sibling();
        while let Some(candidate) = sibling {
            if candidate.is_element() {
                return Some(candidate.id);
            }
            sibling = candidate.prev_sibling();
        }
        None
    }

    fn rendered_text(&self, node: NodeId) -> String {
        self.node(node)
            .map(|n| layout::rendered_text(&n, &self.layout))
            .unwrap_or_default()
    }

    fn markup_len(&self, node: NodeId) -> usize {
        self.node(node)
            .map(|n| Selection::from(n).inner_html().chars().count())
            .unwrap_or(0)
    }

    fn text_nodes(&self, scope: NodeId) -> Vec<TextNode<NodeId>> {
        let Some(scope) = self.node(scope) else {
            return Vec::new();
        };
        scope
            .descendants()
            .into_iter()
            .filter(NodeRef::is_text)
            .filter_map(|text| {
                let parent = text.parent()?;
                Some(TextNode {
                    text: text.text().to_string(),
                    parent: parent.id,
                })
            })
            .collect()
    }

    fn computed_style(&self, node: NodeId) -> Result<ComputedStyle, DomError> {
        self.node_box(node).map(|b| b.style)
    }

    fn bounding_rect(&self, node: NodeId) -> Result<Rect, DomError> {
        self.node_box(node).map(|b| b.rect)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }
}
