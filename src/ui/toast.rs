//! Transient confirmation notice.

use super::{Context, Task};
use crate::dom::{Document, NodeId, TimerId};

/// The `#app-toast` live region, created on first use.
#[derive(Debug, Clone, Default)]
pub struct Toast {
    node: Option<NodeId>,
    timer: Option<TimerId>,
}

impl Toast {
    /// Creates a toast that has not been shown yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `text` and restarts the auto-dismiss timer.
    pub fn show(&mut self, cx: &mut Context<'_>, text: &str) {
        let node = self.ensure_node(cx.doc);
        cx.doc.set_text(node, text);
        cx.doc.add_class(node, "show");
        if let Some(timer) = self.timer.take() {
            cx.scheduler.clear_timeout(timer);
        }
        self.timer = Some(
            cx.scheduler
                .set_timeout(cx.config.modal.toast_duration_ms, Task::DismissToast),
        );
        tracing::debug!("toast shown: {text}");
    }

    /// Timer callback: hides the notice.
    pub fn dismiss(&mut self, doc: &mut Document) {
        self.timer = None;
        if let Some(node) = self.node {
            doc.remove_class(node, "show");
        }
    }

    /// Whether the notice is currently shown.
    pub fn is_visible(&self, doc: &Document) -> bool {
        self.node.is_some_and(|node| doc.has_class(node, "show"))
    }

    /// Text of the notice, if it was ever shown.
    pub fn text(&self, doc: &Document) -> Option<String> {
        self.node.map(|node| doc.text_content(node))
    }

    fn ensure_node(&mut self, doc: &mut Document) -> NodeId {
        if let Some(node) = self.node.filter(|node| doc.is_connected(*node)) {
            return node;
        }
        let node = match doc.get_element_by_id("app-toast") {
            Some(existing) => existing,
            None => {
                let body = doc.body();
                doc.element(
                    body,
                    "div",
                    &[
                        ("id", "app-toast"),
                        ("class", "toast"),
                        ("role", "status"),
                        ("aria-live", "polite"),
                    ],
                )
            }
        };
        self.node = Some(node);
        node
    }
}
