//! Full-screen navigation overlay opened by the burger toggle.

use anyhow::Result;
use serde::Serialize;

use super::focus::trap_tab;
use super::submenu::Submenus;
use super::{Context, LayerKind, Task};
use crate::constants::{CLOSE_MENU_LABEL, OPEN_MENU_LABEL};
use crate::dom::{Document, Key, KeyEvent, NodeId, TimerId};

const SUB_TOGGLE: &str = ".overlay__item.has-sub > .overlay__link";

/// Open/closed state of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayState {
    /// Hidden; the page is interactive
    Closed,
    /// Covering the page and trapping focus
    Open,
}

/// The navigation overlay and its accordion submenus.
#[derive(Debug, Clone)]
pub struct NavOverlay {
    burger: NodeId,
    root: NodeId,
    close_button: Option<NodeId>,
    list: Option<NodeId>,
    submenus: Submenus,
    state: OverlayState,
    last_focused: Option<NodeId>,
    close_timer: Option<TimerId>,
    deferred_restore: Option<NodeId>,
}

impl NavOverlay {
    /// Finds `.nav-toggle` and `#nav-overlay`. Returns `None` when either is
    /// missing.
    pub fn discover(doc: &Document) -> Result<Option<Self>> {
        let burger = doc.query_selector(doc.root(), ".nav-toggle")?;
        let root = doc.get_element_by_id("nav-overlay");
        let (Some(burger), Some(root)) = (burger, root) else {
            tracing::debug!("navigation overlay markup not found");
            return Ok(None);
        };
        Ok(Some(Self {
            burger,
            root,
            close_button: doc.query_selector(root, ".overlay__close")?,
            list: doc.query_selector(root, ".overlay__list")?,
            submenus: Submenus::discover(doc, root)?,
            state: OverlayState::Closed,
            last_focused: None,
            close_timer: None,
            deferred_restore: None,
        }))
    }

    /// The `#nav-overlay` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The burger toggle.
    pub fn burger(&self) -> NodeId {
        self.burger
    }

    /// Current state.
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Whether the overlay is open.
    pub fn is_open(&self) -> bool {
        self.state == OverlayState::Open
    }

    /// The accordion submenus.
    pub fn submenus(&self) -> &Submenus {
        &self.submenus
    }

    /// Element focused when the overlay last opened.
    pub fn last_focused(&self) -> Option<NodeId> {
        self.last_focused
    }

    /// Opens the overlay. No-op when already open.
    pub fn open(&mut self, cx: &mut Context<'_>) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }
        if let Some(timer) = self.close_timer.take() {
            cx.scheduler.clear_timeout(timer);
        }
        self.last_focused = Some(cx.doc.active_element());
        self.deferred_restore = None;
        self.state = OverlayState::Open;
        cx.layers.set_open(LayerKind::NavOverlay, true);
        self.render(cx.doc);

        cx.doc.focus(self.close_button.unwrap_or(self.root));
        self.clear_active_items(cx.doc)?;
        self.submenus.collapse_all_except(cx, None);

        let scrollbar = cx.doc.viewport.scrollbar_width();
        if scrollbar > 0.0 {
            let body = cx.doc.body();
            if let Some(element) = cx.doc.get_mut(body) {
                element.style.padding_right = Some(scrollbar as f32);
            }
        }
        tracing::debug!("overlay opened");
        Ok(())
    }

    /// Closes the overlay. No-op when already closed.
    ///
    /// Focus returns to the element recorded at open time if it is still in
    /// the document. While another layer is open the target is kept for
    /// [`NavOverlay::take_deferred_restore`] instead, so focus never leaves
    /// that layer.
    pub fn close(&mut self, cx: &mut Context<'_>) -> Result<()> {
        if !self.is_open() {
            return Ok(());
        }
        if let Some(timer) = self.close_timer.take() {
            cx.scheduler.clear_timeout(timer);
        }
        self.state = OverlayState::Closed;
        cx.layers.set_open(LayerKind::NavOverlay, false);
        self.render(cx.doc);
        self.clear_active_items(cx.doc)?;
        self.submenus.snap_all_collapsed(cx.doc);

        if let Some(target) = self.last_focused.filter(|n| cx.doc.is_connected(*n)) {
            if cx.layers.any_open() {
                self.deferred_restore = Some(target);
            } else {
                cx.doc.focus(target);
            }
        }
        let body = cx.doc.body();
        if let Some(element) = cx.doc.get_mut(body) {
            element.style.padding_right = None;
        }
        tracing::debug!("overlay closed");
        Ok(())
    }

    /// Burger click.
    pub fn toggle(&mut self, cx: &mut Context<'_>) -> Result<()> {
        if self.is_open() {
            self.close(cx)
        } else {
            self.open(cx)
        }
    }

    /// Focus target withheld by the last close because another layer was
    /// open.
    pub fn take_deferred_restore(&mut self) -> Option<NodeId> {
        self.deferred_restore.take()
    }

    /// Click delegation for the burger and everything inside the overlay.
    /// Returns `true` when the default action is prevented.
    pub fn handle_click(&mut self, cx: &mut Context<'_>, target: NodeId) -> Result<bool> {
        if cx.doc.contains(self.burger, target) {
            self.toggle(cx)?;
            return Ok(false);
        }
        if !cx.doc.contains(self.root, target) {
            return Ok(false);
        }

        let on_close = self
            .close_button
            .is_some_and(|button| cx.doc.contains(button, target))
            || cx.doc.closest(target, ".overlay__close")?.is_some();
        if target == self.root || on_close {
            self.close(cx)?;
            return Ok(false);
        }

        if let Some(toggle) = cx.doc.closest(target, SUB_TOGGLE)? {
            if let Some(item) = cx.doc.closest(toggle, ".overlay__item")? {
                self.submenus.toggle(cx, item);
            }
            return Ok(false);
        }

        if let Some(link) = cx.doc.closest(target, "a[href]")? {
            let placeholder = cx.doc.attribute(link, "href") == Some("#");
            self.clear_active_items(cx.doc)?;
            if let Some(item) = cx.doc.closest(link, ".overlay__item")? {
                cx.doc.add_class(item, "is-active");
            }
            if let Some(timer) = self.close_timer.take() {
                cx.scheduler.clear_timeout(timer);
            }
            self.close_timer = Some(
                cx.scheduler
                    .set_timeout(cx.config.overlay.link_close_delay_ms, Task::CloseOverlay),
            );
            return Ok(placeholder);
        }
        Ok(false)
    }

    /// Deferred close after a link click.
    pub fn on_close_timer(&mut self, cx: &mut Context<'_>) -> Result<()> {
        self.close_timer = None;
        self.close(cx)
    }

    /// Keyboard handling while open. Returns `true` when the key was
    /// consumed.
    pub fn handle_key(&mut self, cx: &mut Context<'_>, event: &KeyEvent) -> Result<bool> {
        if !self.is_open() {
            return Ok(false);
        }
        match event.key {
            Key::Escape => {
                self.close(cx)?;
                return Ok(true);
            }
            Key::ArrowDown | Key::ArrowUp | Key::Home | Key::End => {
                let links = self.top_level_links(cx.doc)?;
                if links.is_empty() {
                    return Ok(true);
                }
                let last = links.len() - 1;
                let current = links.iter().position(|l| *l == cx.doc.active_element());
                let next = match (&event.key, current) {
                    (Key::Home, _) => 0,
                    (Key::End, _) => last,
                    (Key::ArrowDown, None) => 0,
                    (Key::ArrowDown, Some(i)) => (i + 1) % links.len(),
                    (_, None | Some(0)) => last,
                    (_, Some(i)) => i - 1,
                };
                cx.doc.focus(links[next]);
                return Ok(true);
            }
            ref key if key.is_activation() => {
                let active = cx.doc.active_element();
                if cx.doc.contains(self.root, active) && cx.doc.matches(active, SUB_TOGGLE)? {
                    if let Some(item) = cx.doc.closest(active, ".overlay__item")? {
                        self.submenus.toggle(cx, item);
                    }
                    return Ok(true);
                }
            }
            _ => {}
        }
        Ok(trap_tab(cx.doc, self.root, event))
    }

    /// Animation frame for a submenu.
    pub fn on_submenu_frame(&mut self, doc: &mut Document, item: NodeId) {
        self.submenus.on_frame(doc, item);
    }

    /// `transitionend` inside the overlay.
    pub fn on_transition_end(&mut self, doc: &mut Document, target: NodeId, property: &str) -> bool {
        self.submenus.on_transition_end(doc, target, property)
    }

    /// Completes every submenu transition in flight.
    pub fn finish_transitions(&mut self, doc: &mut Document) -> bool {
        let panels = self.submenus.transitioning_panels(doc);
        let mut settled = false;
        for panel in panels {
            settled |= self.submenus.on_transition_end(doc, panel, "height");
        }
        settled
    }

    fn render(&self, doc: &mut Document) {
        let open = self.is_open();
        let flag = if open { "true" } else { "false" };
        doc.set_attribute(self.burger, "aria-expanded", flag);
        doc.toggle_class(self.burger, "is-open", open);
        doc.set_attribute(
            self.burger,
            "aria-label",
            if open { CLOSE_MENU_LABEL } else { OPEN_MENU_LABEL },
        );
        doc.toggle_class(self.root, "is-open", open);
        doc.set_attribute(self.root, "aria-hidden", if open { "false" } else { "true" });
        let body = doc.body();
        doc.toggle_class(body, "nav-open", open);
    }

    fn clear_active_items(&self, doc: &mut Document) -> Result<()> {
        for item in doc.query_selector_all(self.root, ".overlay__item.is-active")? {
            doc.remove_class(item, "is-active");
        }
        Ok(())
    }

    fn top_level_links(&self, doc: &Document) -> Result<Vec<NodeId>> {
        match self.list {
            Some(list) => doc.query_selector_all(list, ":scope > .overlay__item > .overlay__link"),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dom::Scheduler;
    use crate::ui::{LayerRegistry, SubmenuState};

    struct Fixture {
        doc: Document,
        scheduler: Scheduler<Task>,
        layers: LayerRegistry,
        config: Config,
        overlay: NavOverlay,
        opener: NodeId,
        links: Vec<NodeId>,
        sub_item: NodeId,
        placeholder: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut doc = Document::new();
            doc.viewport.client_width = 1265.0;
            let body = doc.body();
            let opener = doc.element(body, "button", &[("class", "nav-toggle")]);
            let root = doc.element(body, "div", &[("id", "nav-overlay"), ("aria-hidden", "true")]);
            doc.element(root, "button", &[("class", "overlay__close")]);
            let list = doc.element(root, "ul", &[("class", "overlay__list")]);

            let home = doc.element(list, "li", &[("class", "overlay__item")]);
            let home_link = doc.element(home, "a", &[("class", "overlay__link"), ("href", "#home")]);
            let sub_item = doc.element(list, "li", &[("class", "overlay__item has-sub")]);
            let sub_link = doc.element(
                sub_item,
                "button",
                &[("class", "overlay__link"), ("aria-expanded", "false")],
            );
            let sub = doc.element(sub_item, "ul", &[("class", "overlay__sub")]);
            doc.get_mut(sub).unwrap().natural_height = 80.0;
            let sub_entry = doc.element(sub, "li", &[]);
            doc.element(sub_entry, "a", &[("href", "#lunch")]);
            let contact = doc.element(list, "li", &[("class", "overlay__item")]);
            let placeholder = doc.element(contact, "a", &[("class", "overlay__link"), ("href", "#")]);

            let overlay = NavOverlay::discover(&doc).unwrap().unwrap();
            Self {
                doc,
                scheduler: Scheduler::new(),
                layers: LayerRegistry::new(),
                config: Config::new(),
                overlay,
                opener,
                links: vec![home_link, sub_link, placeholder],
                sub_item,
                placeholder,
            }
        }

        fn with<R>(&mut self, f: impl FnOnce(&mut NavOverlay, &mut Context<'_>) -> R) -> R {
            let mut cx = Context {
                doc: &mut self.doc,
                scheduler: &mut self.scheduler,
                layers: &mut self.layers,
                config: &self.config,
            };
            f(&mut self.overlay, &mut cx)
        }

        fn key(&mut self, key: Key) -> bool {
            self.with(|o, cx| o.handle_key(cx, &KeyEvent::new(key)).unwrap())
        }
    }

    #[test]
    fn test_open_renders_and_records_focus() {
        let mut f = Fixture::new();
        f.doc.focus(f.opener);
        let opener = f.opener;
        f.with(|o, cx| o.handle_click(cx, opener).unwrap());

        assert!(f.overlay.is_open());
        assert!(f.layers.is_open(LayerKind::NavOverlay));
        assert_eq!(f.overlay.last_focused(), Some(f.opener));
        assert_eq!(f.doc.attribute(f.opener, "aria-expanded"), Some("true"));
        assert_eq!(f.doc.attribute(f.opener, "aria-label"), Some(CLOSE_MENU_LABEL));
        assert_eq!(f.doc.attribute(f.overlay.root(), "aria-hidden"), Some("false"));
        assert!(f.doc.has_class(f.doc.body(), "nav-open"));
        assert!(f.doc.matches(f.doc.active_element(), ".overlay__close").unwrap());
        let padding = f.doc.get(f.doc.body()).unwrap().style.padding_right;
        assert_eq!(padding, Some(15.0));
    }

    #[test]
    fn test_repeated_open_and_close_are_idempotent() {
        let mut f = Fixture::new();
        f.doc.focus(f.opener);
        f.with(|o, cx| {
            o.open(cx).unwrap();
            o.open(cx).unwrap();
        });
        assert_eq!(f.overlay.last_focused(), Some(f.opener));

        f.with(|o, cx| {
            o.close(cx).unwrap();
            o.close(cx).unwrap();
        });
        assert!(!f.overlay.is_open());
        assert_eq!(f.doc.active_element(), f.opener);
        assert_eq!(f.doc.attribute(f.opener, "aria-label"), Some(OPEN_MENU_LABEL));
        assert_eq!(f.doc.get(f.doc.body()).unwrap().style.padding_right, None);
    }

    #[test]
    fn test_close_skips_detached_focus_target() {
        let mut f = Fixture::new();
        f.doc.focus(f.opener);
        f.with(|o, cx| o.open(cx).unwrap());
        let close_button = f.doc.active_element();
        f.doc.detach(f.opener);
        f.with(|o, cx| o.close(cx).unwrap());
        assert_eq!(f.doc.active_element(), close_button);
    }

    #[test]
    fn test_arrow_keys_cycle_top_level_links() {
        let mut f = Fixture::new();
        f.with(|o, cx| o.open(cx).unwrap());

        assert!(f.key(Key::ArrowDown));
        assert_eq!(f.doc.active_element(), f.links[0]);
        f.key(Key::ArrowUp);
        assert_eq!(f.doc.active_element(), f.links[2]);
        f.key(Key::ArrowDown);
        assert_eq!(f.doc.active_element(), f.links[0]);
        f.key(Key::End);
        assert_eq!(f.doc.active_element(), f.links[2]);
        f.key(Key::Home);
        f.key(Key::ArrowDown);
        assert_eq!(f.doc.active_element(), f.links[1]);
    }

    #[test]
    fn test_enter_on_sub_toggle_expands_it() {
        let mut f = Fixture::new();
        f.with(|o, cx| o.open(cx).unwrap());
        f.doc.focus(f.links[1]);
        assert!(f.key(Key::Enter));
        assert_eq!(
            f.overlay.submenus().state(f.sub_item),
            Some(SubmenuState::Expanding)
        );
        assert!(f.key(Key::Space));
        assert_eq!(
            f.overlay.submenus().state(f.sub_item),
            Some(SubmenuState::Collapsed)
        );
    }

    #[test]
    fn test_escape_closes() {
        let mut f = Fixture::new();
        f.with(|o, cx| o.open(cx).unwrap());
        assert!(f.key(Key::Escape));
        assert!(!f.overlay.is_open());
        assert!(!f.key(Key::Escape));
    }

    #[test]
    fn test_link_click_marks_active_then_closes_after_delay() {
        let mut f = Fixture::new();
        f.with(|o, cx| o.open(cx).unwrap());
        let placeholder = f.placeholder;
        let prevented = f.with(|o, cx| o.handle_click(cx, placeholder).unwrap());
        assert!(prevented);
        let item = f.doc.parent(placeholder).unwrap();
        assert!(f.doc.has_class(item, "is-active"));
        assert!(f.overlay.is_open());

        assert_eq!(f.scheduler.pop_due(9), None);
        assert_eq!(f.scheduler.pop_due(10), Some(Task::CloseOverlay));
        f.with(|o, cx| o.on_close_timer(cx).unwrap());
        assert!(!f.overlay.is_open());
        assert!(!f.doc.has_class(item, "is-active"));

        let home = f.links[0];
        f.with(|o, cx| o.open(cx).unwrap());
        assert!(!f.with(|o, cx| o.handle_click(cx, home).unwrap()));
    }

    #[test]
    fn test_backdrop_click_closes_and_snaps_submenus() {
        let mut f = Fixture::new();
        let (toggle, item) = (f.links[1], f.sub_item);
        f.with(|o, cx| {
            o.open(cx).unwrap();
            o.handle_click(cx, toggle).unwrap();
        });
        assert!(f.overlay.submenus().state(item).unwrap().is_open());

        let root = f.overlay.root();
        f.with(|o, cx| o.handle_click(cx, root).unwrap());
        assert!(!f.overlay.is_open());
        assert_eq!(f.overlay.submenus().state(item), Some(SubmenuState::Collapsed));
        assert_eq!(f.doc.attribute(toggle, "aria-expanded"), Some("false"));
    }

    #[test]
    fn test_close_defers_focus_while_another_layer_is_open() {
        let mut f = Fixture::new();
        f.doc.focus(f.opener);
        f.with(|o, cx| o.open(cx).unwrap());
        f.layers.set_open(LayerKind::Modal, true);
        let focused = f.doc.active_element();

        f.with(|o, cx| o.close(cx).unwrap());
        assert_eq!(f.doc.active_element(), focused);
        assert_eq!(f.overlay.take_deferred_restore(), Some(f.opener));
        assert_eq!(f.overlay.take_deferred_restore(), None);
    }
}
