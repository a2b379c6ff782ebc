//! Sticky bottom action bar.

use anyhow::Result;

use super::LayerRegistry;
use crate::config::Config;
use crate::dom::{Document, NodeId};

/// Whether the bar should be on screen.
///
/// ```
/// use bistro_ui::ui::bottom_bar::bottom_bar_visible;
///
/// assert!(bottom_bar_visible(150.0, 120.0, false, false));
/// assert!(!bottom_bar_visible(150.0, 120.0, true, false));
/// ```
pub fn bottom_bar_visible(
    scroll_y: f64,
    threshold: f64,
    any_layer_open: bool,
    footer_in_view: bool,
) -> bool {
    scroll_y > threshold && !any_layer_open && !footer_in_view
}

/// The `#bottom-bar` element. Visibility is re-derived from its inputs on
/// every update and never cached.
#[derive(Debug, Clone)]
pub struct BottomBar {
    node: NodeId,
    threshold: f64,
    footer: Option<NodeId>,
    footer_in_view: bool,
}

impl BottomBar {
    /// Finds `#bottom-bar`. A parsable `data-threshold` overrides the
    /// configured threshold.
    pub fn discover(doc: &Document, config: &Config) -> Result<Option<Self>> {
        let Some(node) = doc.get_element_by_id("bottom-bar") else {
            tracing::debug!("bottom bar markup not found");
            return Ok(None);
        };
        let threshold = match doc.attribute(node, "data-threshold") {
            Some(raw) => raw.trim().parse::<f64>().unwrap_or_else(|_| {
                tracing::warn!("ignoring bottom bar threshold {raw:?}");
                config.bottom_bar.threshold
            }),
            None => config.bottom_bar.threshold,
        };
        Ok(Some(Self {
            node,
            threshold,
            footer: doc.query_selector(doc.root(), ".footer")?,
            footer_in_view: false,
        }))
    }

    /// The bar element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Effective scroll threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Renders `show` from the scroll offset and the open layers.
    pub fn update(&self, doc: &mut Document, layers: &LayerRegistry) {
        let show = doc.viewport.scroll_y > self.threshold && !layers.any_open();
        doc.toggle_class(self.node, "show", show);
    }

    /// Footer intersection change. Ignored when the page has no footer.
    pub fn set_footer_in_view(&mut self, doc: &mut Document, in_view: bool) {
        if self.footer.is_none() {
            return;
        }
        self.footer_in_view = in_view;
        doc.toggle_class(self.node, "hide", in_view);
    }

    /// Whether the bar is on screen.
    pub fn is_visible(&self, doc: &Document, layers: &LayerRegistry) -> bool {
        bottom_bar_visible(
            doc.viewport.scroll_y,
            self.threshold,
            layers.any_open(),
            self.footer_in_view,
        )
    }
}
