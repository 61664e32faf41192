//! Visibility predicate.

use crate::dom::{ComputedStyle, Display, DomError, PageDom, Rect, Viewport, Visibility};

use super::PageClassifier;

/// Opacity at or below which an element counts as invisible.
const MIN_OPACITY: f64 = 0.05;

/// Width and height at or below which an element has no rendered size.
const MIN_EXTENT: f64 = 1.0;

/// True when `rect` intersects the window running from `allowance` px above
/// the viewport top to `multiplier` viewport heights below it.
#[must_use]
pub fn in_extended_window(rect: &Rect, viewport: Viewport, multiplier: f64, allowance: f64) -> bool {
    rect.bottom() > -allowance && rect.top < viewport.height * multiplier
}

fn is_painted(style: &ComputedStyle) -> bool {
    style.display != Display::None
        && style.visibility != Visibility::Hidden
        && style.opacity > MIN_OPACITY
}

impl<D: PageDom> PageClassifier<'_, D> {
    /// True when the element is rendered, painted, has a non-trivial size
    /// and lies within the extended viewport window.
    pub fn is_visible(&self, node: D::Node) -> bool {
        match self.check_visible(node) {
            Ok(visible) => visible,
            Err(err) => {
                tracing::warn!(?node, error = %err, "visibility check failed, treating as visible");
                true
            }
        }
    }

    fn check_visible(&self, node: D::Node) -> Result<bool, DomError> {
        let style = self.page.computed_style(node)?;
        let rect = self.page.bounding_rect(node)?;
        Ok(is_painted(&style)
            && rect.width > MIN_EXTENT
            && rect.height > MIN_EXTENT
            && in_extended_window(
                &rect,
                self.page.viewport(),
                self.config.viewport_multiplier,
                self.heuristics.above_fold_allowance,
            ))
    }
}
