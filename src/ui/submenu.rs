//! Accordion submenus inside the navigation overlay.
//!
//! Each `.overlay__item.has-sub` runs its own height animation:
//! `Collapsed -> Expanding -> Expanded -> Collapsing -> Collapsed`. The
//! animated value is written on the next animation frame and the state
//! settles when the panel reports `transitionend` for `height`. Frame and
//! transition handlers check the current state first, so a collapse issued
//! mid-expansion simply wins.

use anyhow::Result;

use super::{Context, Task};
use crate::dom::{Document, Height, NodeId};

/// Animation state of one submenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmenuState {
    /// Panel closed at zero height
    Collapsed,
    /// Growing toward its natural height
    Expanding,
    /// Open at `height: auto`
    Expanded,
    /// Shrinking toward zero
    Collapsing,
}

impl SubmenuState {
    /// Expanded or on its way there.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Expanding | Self::Expanded)
    }
}

#[derive(Debug, Clone)]
struct Submenu {
    item: NodeId,
    toggle: Option<NodeId>,
    panel: Option<NodeId>,
    state: SubmenuState,
}

/// The accordion: at most one submenu open at a time.
#[derive(Debug, Clone, Default)]
pub struct Submenus {
    items: Vec<Submenu>,
}

impl Submenus {
    /// Finds every `.overlay__item.has-sub` under `overlay`.
    pub fn discover(doc: &Document, overlay: NodeId) -> Result<Self> {
        let mut items = Vec::new();
        for item in doc.query_selector_all(overlay, ".overlay__item.has-sub")? {
            items.push(Submenu {
                item,
                toggle: doc.query_selector(item, ".overlay__link")?,
                panel: doc.query_selector(item, ".overlay__sub")?,
                state: SubmenuState::Collapsed,
            });
        }
        Ok(Self { items })
    }

    /// Number of submenu items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the overlay has no submenus.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// State of the submenu rooted at `item`.
    pub fn state(&self, item: NodeId) -> Option<SubmenuState> {
        self.find(item).map(|submenu| submenu.state)
    }

    /// Items currently expanded or expanding.
    pub fn open_items(&self) -> Vec<NodeId> {
        self.items
            .iter()
            .filter(|submenu| submenu.state.is_open())
            .map(|submenu| submenu.item)
            .collect()
    }

    /// Expands `item` after collapsing every sibling.
    pub fn expand(&mut self, cx: &mut Context<'_>, item: NodeId) {
        if self.find(item).is_none() {
            return;
        }
        self.collapse_all_except(cx, Some(item));
        let reduced_motion = cx.config.motion.reduced_motion;
        let Some(submenu) = self.find_mut(item) else {
            return;
        };
        if let Some(toggle) = submenu.toggle {
            cx.doc.set_attribute(toggle, "aria-expanded", "true");
        }
        cx.doc.add_class(item, "is-active");

        let Some(panel) = submenu.panel else {
            submenu.state = SubmenuState::Expanded;
            return;
        };
        let target = cx.doc.get(panel).map_or(0.0, |e| e.natural_height);
        if reduced_motion || target <= 0.0 {
            set_height(cx.doc, panel, Height::Auto);
            submenu.state = SubmenuState::Expanded;
            return;
        }
        set_height(cx.doc, panel, Height::Px(0.0));
        submenu.state = SubmenuState::Expanding;
        cx.scheduler.request_animation_frame(Task::SubmenuFrame(item));
        tracing::debug!("submenu expanding to {target}px");
    }

    /// Collapses `item`, animating from its rendered height.
    pub fn collapse(&mut self, cx: &mut Context<'_>, item: NodeId) {
        let reduced_motion = cx.config.motion.reduced_motion;
        let Some(submenu) = self.find_mut(item) else {
            return;
        };
        if let Some(toggle) = submenu.toggle {
            cx.doc.set_attribute(toggle, "aria-expanded", "false");
        }
        cx.doc.remove_class(item, "is-active");

        let Some(panel) = submenu.panel else {
            submenu.state = SubmenuState::Collapsed;
            return;
        };
        if submenu.state == SubmenuState::Collapsed {
            return;
        }
        let current = cx.doc.get(panel).map_or(0.0, |e| e.rendered_height());
        if reduced_motion || current <= 0.0 {
            set_height(cx.doc, panel, Height::Px(0.0));
            submenu.state = SubmenuState::Collapsed;
            return;
        }
        set_height(cx.doc, panel, Height::Px(current));
        submenu.state = SubmenuState::Collapsing;
        cx.scheduler.request_animation_frame(Task::SubmenuFrame(item));
    }

    /// Collapses every submenu other than `exception`.
    pub fn collapse_all_except(&mut self, cx: &mut Context<'_>, exception: Option<NodeId>) {
        let others: Vec<NodeId> = self
            .items
            .iter()
            .map(|submenu| submenu.item)
            .filter(|item| Some(*item) != exception)
            .collect();
        for item in others {
            self.collapse(cx, item);
        }
    }

    /// Click or Enter/Space on a toggle: collapse if open, else expand exclusively.
    pub fn toggle(&mut self, cx: &mut Context<'_>, item: NodeId) {
        let expanded = self
            .find(item)
            .and_then(|submenu| submenu.toggle)
            .and_then(|toggle| cx.doc.attribute(toggle, "aria-expanded"))
            == Some("true");
        if expanded {
            self.collapse(cx, item);
        } else {
            self.expand(cx, item);
        }
    }

    /// Jumps every submenu to its collapsed end state, dropping animations
    /// in flight.
    pub fn snap_all_collapsed(&mut self, doc: &mut Document) {
        for submenu in &mut self.items {
            if let Some(toggle) = submenu.toggle {
                doc.set_attribute(toggle, "aria-expanded", "false");
            }
            doc.remove_class(submenu.item, "is-active");
            if let Some(panel) = submenu.panel {
                if submenu.state != SubmenuState::Collapsed {
                    set_height(doc, panel, Height::Px(0.0));
                }
            }
            submenu.state = SubmenuState::Collapsed;
        }
    }

    /// Animation frame: start the height transition toward the target.
    pub fn on_frame(&mut self, doc: &mut Document, item: NodeId) {
        let Some(submenu) = self.find_mut(item) else {
            return;
        };
        let Some(panel) = submenu.panel else {
            return;
        };
        match submenu.state {
            SubmenuState::Expanding => {
                let target = doc.get(panel).map_or(0.0, |e| e.natural_height);
                set_height(doc, panel, Height::Px(target));
            }
            SubmenuState::Collapsing => set_height(doc, panel, Height::Px(0.0)),
            SubmenuState::Collapsed | SubmenuState::Expanded => {}
        }
    }

    /// `transitionend` on a panel. Returns `true` if it settled a submenu.
    pub fn on_transition_end(&mut self, doc: &mut Document, panel: NodeId, property: &str) -> bool {
        if property != "height" {
            return false;
        }
        let Some(submenu) = self.items.iter_mut().find(|s| s.panel == Some(panel)) else {
            return false;
        };
        match submenu.state {
            SubmenuState::Expanding => {
                set_height(doc, panel, Height::Auto);
                submenu.state = SubmenuState::Expanded;
                true
            }
            SubmenuState::Collapsing => {
                submenu.state = SubmenuState::Collapsed;
                true
            }
            SubmenuState::Collapsed | SubmenuState::Expanded => false,
        }
    }

    /// Panels whose height transition has started and not yet ended.
    pub fn transitioning_panels(&self, doc: &Document) -> Vec<NodeId> {
        self.items
            .iter()
            .filter_map(|submenu| {
                let panel = submenu.panel?;
                let height = doc.get(panel)?.style.height;
                let started = match submenu.state {
                    SubmenuState::Expanding => height != Some(Height::Px(0.0)),
                    SubmenuState::Collapsing => height == Some(Height::Px(0.0)),
                    SubmenuState::Collapsed | SubmenuState::Expanded => false,
                };
                started.then_some(panel)
            })
            .collect()
    }

    fn find(&self, item: NodeId) -> Option<&Submenu> {
        self.items.iter().find(|submenu| submenu.item == item)
    }

    fn find_mut(&mut self, item: NodeId) -> Option<&mut Submenu> {
        self.items.iter_mut().find(|submenu| submenu.item == item)
    }
}

fn set_height(doc: &mut Document, panel: NodeId, height: Height) {
    if let Some(element) = doc.get_mut(panel) {
        element.style.height = Some(height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dom::Scheduler;
    use crate::ui::LayerRegistry;

    struct Fixture {
        doc: Document,
        scheduler: Scheduler<Task>,
        layers: LayerRegistry,
        config: Config,
        submenus: Submenus,
        items: Vec<NodeId>,
        panels: Vec<NodeId>,
    }

    impl Fixture {
        fn new(reduced_motion: bool) -> Self {
            let mut doc = Document::new();
            let body = doc.body();
            let overlay = doc.element(body, "nav", &[("id", "nav-overlay")]);
            let mut items = Vec::new();
            let mut panels = Vec::new();
            for label in ["Menu", "Events", "Wine"] {
                let item = doc.element(overlay, "li", &[("class", "overlay__item has-sub")]);
                doc.text_element(
                    item,
                    "button",
                    &[("class", "overlay__link"), ("aria-expanded", "false")],
                    label,
                );
                let panel = doc.element(item, "ul", &[("class", "overlay__sub")]);
                doc.get_mut(panel).unwrap().natural_height = 120.0;
                items.push(item);
                panels.push(panel);
            }
            let submenus = Submenus::discover(&doc, overlay).unwrap();
            let mut config = Config::new();
            config.motion.reduced_motion = reduced_motion;
            Self {
                doc,
                scheduler: Scheduler::new(),
                layers: LayerRegistry::new(),
                config,
                submenus,
                items,
                panels,
            }
        }

        fn with<R>(&mut self, f: impl FnOnce(&mut Submenus, &mut Context<'_>) -> R) -> R {
            let mut cx = Context {
                doc: &mut self.doc,
                scheduler: &mut self.scheduler,
                layers: &mut self.layers,
                config: &self.config,
            };
            f(&mut self.submenus, &mut cx)
        }

        fn run_frame(&mut self) {
            for task in self.scheduler.take_frame() {
                if let Task::SubmenuFrame(item) = task {
                    self.submenus.on_frame(&mut self.doc, item);
                }
            }
        }

        fn height(&self, panel: NodeId) -> Option<Height> {
            self.doc.get(panel).unwrap().style.height
        }

        fn aria(&self, item: NodeId) -> String {
            let toggle = self.doc.query_selector(item, ".overlay__link").unwrap().unwrap();
            self.doc.attribute(toggle, "aria-expanded").unwrap().to_string()
        }
    }

    #[test]
    fn test_expand_runs_through_frame_and_transition_end() {
        let mut f = Fixture::new(false);
        let (item, panel) = (f.items[0], f.panels[0]);
        f.with(|s, cx| s.expand(cx, item));

        assert_eq!(f.submenus.state(item), Some(SubmenuState::Expanding));
        assert_eq!(f.aria(item), "true");
        assert!(f.doc.has_class(item, "is-active"));
        assert_eq!(f.height(panel), Some(Height::Px(0.0)));

        f.run_frame();
        assert_eq!(f.height(panel), Some(Height::Px(120.0)));
        assert_eq!(f.submenus.transitioning_panels(&f.doc), vec![panel]);

        assert!(!f.submenus.on_transition_end(&mut f.doc, panel, "opacity"));
        assert!(f.submenus.on_transition_end(&mut f.doc, panel, "height"));
        assert_eq!(f.submenus.state(item), Some(SubmenuState::Expanded));
        assert_eq!(f.height(panel), Some(Height::Auto));
    }

    #[test]
    fn test_collapse_animates_from_rendered_height() {
        let mut f = Fixture::new(false);
        let (item, panel) = (f.items[1], f.panels[1]);
        f.with(|s, cx| s.expand(cx, item));
        f.run_frame();
        f.submenus.on_transition_end(&mut f.doc, panel, "height");

        f.with(|s, cx| s.collapse(cx, item));
        assert_eq!(f.submenus.state(item), Some(SubmenuState::Collapsing));
        assert_eq!(f.height(panel), Some(Height::Px(120.0)));
        assert_eq!(f.aria(item), "false");
        assert!(!f.doc.has_class(item, "is-active"));

        f.run_frame();
        assert_eq!(f.height(panel), Some(Height::Px(0.0)));
        f.submenus.on_transition_end(&mut f.doc, panel, "height");
        assert_eq!(f.submenus.state(item), Some(SubmenuState::Collapsed));
    }

    #[test]
    fn test_reduced_motion_snaps() {
        let mut f = Fixture::new(true);
        let (item, panel) = (f.items[0], f.panels[0]);
        f.with(|s, cx| s.expand(cx, item));
        assert_eq!(f.submenus.state(item), Some(SubmenuState::Expanded));
        assert_eq!(f.height(panel), Some(Height::Auto));
        assert_eq!(f.scheduler.pending_frames(), 0);

        f.with(|s, cx| s.collapse(cx, item));
        assert_eq!(f.submenus.state(item), Some(SubmenuState::Collapsed));
        assert_eq!(f.height(panel), Some(Height::Px(0.0)));
    }

    #[test]
    fn test_accordion_keeps_one_open() {
        let mut f = Fixture::new(false);
        let items = f.items.clone();
        f.with(|s, cx| s.expand(cx, items[0]));
        f.run_frame();
        f.with(|s, cx| s.expand(cx, items[2]));
        assert_eq!(f.submenus.open_items(), vec![items[2]]);
        assert_eq!(f.aria(items[0]), "false");

        f.with(|s, cx| {
            s.toggle(cx, items[1]);
            s.toggle(cx, items[0]);
        });
        assert_eq!(f.submenus.open_items(), vec![items[0]]);

        f.with(|s, cx| s.toggle(cx, items[0]));
        assert!(f.submenus.open_items().is_empty());
    }

    #[test]
    fn test_collapse_before_first_frame_cancels_expansion() {
        let mut f = Fixture::new(false);
        let (item, panel) = (f.items[0], f.panels[0]);
        f.with(|s, cx| {
            s.expand(cx, item);
            s.collapse(cx, item);
        });
        assert_eq!(f.submenus.state(item), Some(SubmenuState::Collapsed));
        f.run_frame();
        assert_eq!(f.height(panel), Some(Height::Px(0.0)));
    }

    #[test]
    fn test_snap_all_collapsed_drops_animations() {
        let mut f = Fixture::new(false);
        let (item, panel) = (f.items[0], f.panels[0]);
        f.with(|s, cx| s.expand(cx, item));
        f.run_frame();
        f.submenus.snap_all_collapsed(&mut f.doc);

        assert_eq!(f.submenus.state(item), Some(SubmenuState::Collapsed));
        assert_eq!(f.height(panel), Some(Height::Px(0.0)));
        assert!(!f.submenus.on_transition_end(&mut f.doc, panel, "height"));
    }
}
