//! Registry of the blocking layers currently open.
//!
//! The overlay and modal report their transitions here. The bottom bar
//! reads it instead of caching anything, and keyboard input is routed to
//! the topmost open layer.

/// A blocking UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Full-screen navigation overlay
    NavOverlay,
    /// Reservation dialog
    Modal,
}

/// Open layers in stacking order plus a change flag.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    stack: Vec<LayerKind>,
    dirty: bool,
}

impl LayerRegistry {
    /// Creates a registry with every layer closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a transition. Opening moves the layer to the top.
    pub fn set_open(&mut self, kind: LayerKind, open: bool) {
        self.stack.retain(|layer| *layer != kind);
        if open {
            self.stack.push(kind);
        }
        self.dirty = true;
    }

    /// Whether `kind` is open.
    pub fn is_open(&self, kind: LayerKind) -> bool {
        self.stack.contains(&kind)
    }

    /// Whether any layer is open.
    pub fn any_open(&self) -> bool {
        !self.stack.is_empty()
    }

    /// The most recently opened layer still open.
    pub fn topmost(&self) -> Option<LayerKind> {
        self.stack.last().copied()
    }

    /// Returns whether a transition happened since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topmost_follows_open_order() {
        let mut layers = LayerRegistry::new();
        assert_eq!(layers.topmost(), None);

        layers.set_open(LayerKind::NavOverlay, true);
        layers.set_open(LayerKind::Modal, true);
        assert_eq!(layers.topmost(), Some(LayerKind::Modal));

        layers.set_open(LayerKind::Modal, false);
        assert_eq!(layers.topmost(), Some(LayerKind::NavOverlay));
        assert!(!layers.is_open(LayerKind::Modal));
    }

    #[test]
    fn test_reopening_does_not_duplicate() {
        let mut layers = LayerRegistry::new();
        layers.set_open(LayerKind::Modal, true);
        layers.set_open(LayerKind::Modal, true);
        layers.set_open(LayerKind::Modal, false);
        assert!(!layers.any_open());
    }

    #[test]
    fn test_take_dirty_resets() {
        let mut layers = LayerRegistry::new();
        assert!(!layers.take_dirty());
        layers.set_open(LayerKind::NavOverlay, true);
        assert!(layers.take_dirty());
        assert!(!layers.take_dirty());
    }
}
