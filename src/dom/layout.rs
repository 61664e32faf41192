//! Layout estimate for static HTML.
//!
//! Static markup carries no rendering engine, so `HtmlPage` approximates one:
//! computed style comes from tag defaults, the `hidden` attribute and inline
//! `style` declarations; geometry comes from a single vertical flow in which
//! text advances a cursor by whole lines. The estimate is deterministic and
//! computed once per page.

use std::collections::HashMap;

use dom_query::{NodeId, NodeRef};

use super::{ComputedStyle, Display, Rect, Viewport, Visibility};

/// Average glyph advance in CSS px.
const CHAR_WIDTH: f64 = 8.0;

/// Line box height in CSS px.
const LINE_HEIGHT: f64 = 24.0;

/// Deeper subtrees are left out of the estimate.
const MAX_DEPTH: usize = 512;

/// Elements that generate no box.
const NON_RENDERED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "title", "meta", "link", "base",
];

/// Elements laid out as blocks. Everything else is inline.
const BLOCK_TAGS: &[&str] = &[
    "html", "body", "address", "article", "aside", "blockquote", "details", "dialog", "dd",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section",
    "summary", "table", "tbody", "thead", "tfoot", "tr", "td", "th", "caption", "ul",
];

/// Style and geometry of one element.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeBox {
    pub style: ComputedStyle,
    pub rect: Rect,
    /// False when the element or an ancestor is `display: none`.
    pub rendered: bool,
}

/// Declarations read from an inline `style` attribute.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct InlineStyle {
    pub display: Option<Display>,
    pub visibility: Option<Visibility>,
    pub opacity: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Parse the declarations the estimate understands; others are ignored.
pub(crate) fn parse_inline_style(style: &str) -> InlineStyle {
    let mut out = InlineStyle::default();
    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        match property.as_str() {
            "display" => {
                out.display = Some(match value.as_str() {
                    "none" => Display::None,
                    "inline" | "inline-block" | "inline-flex" => Display::Inline,
                    _ => Display::Block,
                });
            }
            "visibility" => {
                out.visibility = Some(match value.as_str() {
                    "hidden" | "collapse" => Visibility::Hidden,
                    _ => Visibility::Visible,
                });
            }
            "opacity" => out.opacity = value.parse::<f64>().ok().map(|o| o.clamp(0.0, 1.0)),
            "width" => out.width = parse_px(&value),
            "height" => out.height = parse_px(&value),
            _ => {}
        }
    }
    out
}

/// `"120px"` or `"120"` → 120.0. Relative units are not resolved.
pub(crate) fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

fn tag_of(node: &NodeRef) -> String {
    node.node_name()
        .map(|t| t.to_ascii_lowercase())
        .unwrap_or_default()
}

fn default_display(tag: &str) -> Display {
    if NON_RENDERED_TAGS.contains(&tag) {
        Display::None
    } else if BLOCK_TAGS.contains(&tag) {
        Display::Block
    } else {
        Display::Inline
    }
}

/// Vertical space taken by a run of text in a box of `width`.
fn text_height(text: &str, width: f64) -> f64 {
    let chars = text.split_whitespace().map(|w| w.chars().count() + 1).sum::<usize>();
    if chars == 0 {
        return 0.0;
    }
    let per_line = (width.max(CHAR_WIDTH) / CHAR_WIDTH).floor();
    (chars as f64 / per_line).ceil() * LINE_HEIGHT
}

/// Compute boxes for `root` and all its descendant elements.
pub(crate) fn estimate(root: &NodeRef, viewport: Viewport) -> HashMap<NodeId, NodeBox> {
    let mut boxes = HashMap::new();
    let mut cursor = 0.0;
    let mut flow = Flow {
        boxes: &mut boxes,
        cursor: &mut cursor,
    };
    flow.element(root, &ComputedStyle::default(), true, viewport.width, 0);
    boxes
}

struct Flow<'b> {
    boxes: &'b mut HashMap<NodeId, NodeBox>,
    cursor: &'b mut f64,
}

impl Flow<'_> {
    fn element(&mut self, node: &NodeRef, parent: &ComputedStyle, parent_rendered: bool, parent_width: f64, depth: usize) {
        if depth > MAX_DEPTH {
            return;
        }

        let tag = tag_of(node);
        let inline = node
            .attr("style")
            .map(|s| parse_inline_style(&s))
            .unwrap_or_default();

        let mut display = inline.display.unwrap_or_else(|| default_display(&tag));
        if node.attr("hidden").is_some() || NON_RENDERED_TAGS.contains(&tag.as_str()) {
            display = Display::None;
        }
        let style = ComputedStyle {
            display,
            visibility: inline.visibility.unwrap_or(parent.visibility),
            opacity: inline.opacity.unwrap_or(1.0),
        };
        let rendered = parent_rendered && display != Display::None;

        let explicit_width = inline
            .width
            .or_else(|| node.attr("width").and_then(|w| parse_px(&w)));
        let explicit_height = inline
            .height
            .or_else(|| node.attr("height").and_then(|h| parse_px(&h)));
        let width = explicit_width.unwrap_or(parent_width);

        let top = *self.cursor;
        for child in node.children() {
            if child.is_element() {
                self.element(&child, &style, rendered, width, depth + 1);
            } else if child.is_text() && rendered {
                *self.cursor += text_height(&child.text(), width);
            }
        }

        let rect = if rendered {
            let height = match explicit_height {
                Some(h) => {
                    *self.cursor = top + h;
                    h
                }
                None => *self.cursor - top,
            };
            Rect {
                top,
                left: 0.0,
                width,
                height,
            }
        } else {
            Rect {
                top,
                ..Rect::default()
            }
        };

        self.boxes.insert(node.id, NodeBox { style, rect, rendered });
    }
}

/// Accumulates rendered text with `innerText`-style line breaks.
#[derive(Default)]
struct TextSink {
    buf: String,
    pending_breaks: usize,
    pending_space: bool,
}

impl TextSink {
    fn require_breaks(&mut self, n: usize) {
        self.pending_breaks = self.pending_breaks.max(n);
        self.pending_space = false;
    }

    fn flush_separator(&mut self) {
        if self.buf.is_empty() {
            self.pending_breaks = 0;
            self.pending_space = false;
            return;
        }
        if self.pending_breaks > 0 {
            for _ in 0..self.pending_breaks {
                self.buf.push('\n');
            }
        } else if self.pending_space {
            self.buf.push(' ');
        }
        self.pending_breaks = 0;
        self.pending_space = false;
    }

    /// `<br>`: a line break that does not collapse with its neighbours.
    fn hard_break(&mut self) {
        self.pending_space = false;
        if self.buf.is_empty() {
            return;
        }
        for _ in 0..self.pending_breaks {
            self.buf.push('\n');
        }
        self.pending_breaks = 0;
        self.buf.push('\n');
    }

    fn push_text(&mut self, text: &str, preformatted: bool) {
        if preformatted {
            if !text.is_empty() {
                self.flush_separator();
                self.buf.push_str(text);
            }
            return;
        }
        for c in text.chars() {
            if c.is_whitespace() {
                if self.pending_breaks == 0 {
                    self.pending_space = true;
                }
            } else {
                self.flush_separator();
                self.buf.push(c);
            }
        }
    }
}

/// Rendered text of `node`, skipping subtrees that produce no box.
///
/// A node that is itself not rendered reports its whitespace-collapsed
/// text content, as browsers do for `innerText` on such elements.
pub(crate) fn rendered_text(node: &NodeRef, boxes: &HashMap<NodeId, NodeBox>) -> String {
    let rendered = boxes.get(&node.id).is_some_and(|b| b.rendered);
    if !rendered {
        return node.text().split_whitespace().collect::<Vec<_>>().join(" ");
    }
    let mut sink = TextSink::default();
    collect_text(node, boxes, &mut sink, false, 0);
    sink.buf
}

fn collect_text(node: &NodeRef, boxes: &HashMap<NodeId, NodeBox>, sink: &mut TextSink, preformatted: bool, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    let Some(node_box) = boxes.get(&node.id) else {
        return;
    };
    if !node_box.rendered {
        return;
    }

    let tag = tag_of(node);
    if tag == "br" {
        sink.hard_break();
        return;
    }

    let breaks = match (tag.as_str(), node_box.style.display) {
        ("p", _) => 2,
        (_, Display::Block) => 1,
        _ => 0,
    };
    sink.require_breaks(breaks);

    let preformatted = preformatted || tag == "pre" || tag == "textarea";
    let painted = node_box.style.visibility == Visibility::Visible;
    for child in node.children() {
        if child.is_element() {
            collect_text(&child, boxes, sink, preformatted, depth + 1);
        } else if child.is_text() && painted {
            sink.push_text(&child.text(), preformatted);
        }
    }

    sink.require_breaks(breaks);
}
