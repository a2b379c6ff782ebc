//! Sticky site header that turns translucent and hides while scrolling down.

use crate::dom::{Document, NodeId};

/// The `[data-header]` element and the last scroll offset it saw.
#[derive(Debug, Clone)]
pub struct SiteHeader {
    node: NodeId,
    last_y: f64,
    hide_after: f64,
}

impl SiteHeader {
    /// Finds the `[data-header]` element.
    pub fn discover(doc: &Document, hide_after: f64) -> Option<Self> {
        let node = doc
            .descendants(doc.root())
            .find(|node| doc.has_attribute(*node, "data-header"))?;
        Some(Self {
            node,
            last_y: doc.viewport.scroll_y,
            hide_after,
        })
    }

    /// The header element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Applies the current scroll offset.
    pub fn on_scroll(&mut self, doc: &mut Document) {
        let y = doc.viewport.scroll_y;
        doc.toggle_class(self.node, "is-glass", y > 0.0);
        doc.toggle_class(self.node, "is-hidden", y > self.last_y && y > self.hide_after);
        self.last_y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hides_only_when_scrolling_down_past_offset() {
        let mut doc = Document::new();
        let body = doc.body();
        let node = doc.element(body, "header", &[("class", "site-header"), ("data-header", "")]);
        let mut header = SiteHeader::discover(&doc, 50.0).unwrap();

        header.on_scroll(&mut doc);
        assert!(!doc.has_class(node, "is-glass"));

        doc.viewport.scroll_y = 40.0;
        header.on_scroll(&mut doc);
        assert!(doc.has_class(node, "is-glass"));
        assert!(!doc.has_class(node, "is-hidden"));

        doc.viewport.scroll_y = 200.0;
        header.on_scroll(&mut doc);
        assert!(doc.has_class(node, "is-hidden"));

        doc.viewport.scroll_y = 180.0;
        header.on_scroll(&mut doc);
        assert!(!doc.has_class(node, "is-hidden"));
        assert!(doc.has_class(node, "is-glass"));
    }

    #[test]
    fn test_missing_header() {
        assert!(SiteHeader::discover(&Document::new(), 50.0).is_none());
    }
}
