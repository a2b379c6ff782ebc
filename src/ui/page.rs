//! The mounted page: owns the document, discovers the controllers and
//! routes every input event to them.

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use super::{
    BottomBar, Carousel, Context, CustomSelects, LayerKind, LayerRegistry, ModalState, NavOverlay,
    OverlayState, ReservationField, ReservationModal, SiteHeader, SubmitOutcome, Task,
};
use crate::config::Config;
use crate::dom::{Document, KeyEvent, NodeId, Scheduler};

/// Upper bound on [`Page::settle`] iterations.
const SETTLE_ROUNDS: usize = 256;

/// Borrows the page's parts as a controller [`Context`].
macro_rules! cx {
    ($page:expr) => {
        Context {
            doc: &mut $page.doc,
            scheduler: &mut $page.scheduler,
            layers: &mut $page.layers,
            config: &$page.config,
        }
    };
}

/// Serialisable summary of the page state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSnapshot {
    /// Navigation overlay state, `None` without overlay markup
    pub overlay: Option<OverlayState>,
    /// Reservation dialog state, `None` without dialog markup
    pub modal: Option<ModalState>,
    /// Whether the bottom bar is on screen
    pub bottom_bar_visible: bool,
    /// Labels of the expanded or expanding submenus
    pub expanded_submenus: Vec<String>,
    /// The focused element, as `tag#id.class`
    pub focused: String,
    /// Text of the confirmation notice while it is shown
    pub toast: Option<String>,
    /// Current testimonial (0-based)
    pub carousel_index: Option<usize>,
    /// Dialog fields rendered invalid
    pub invalid_fields: Vec<ReservationField>,
    /// Window scroll offset
    pub scroll_y: f64,
    /// Virtual clock
    pub now_ms: u64,
}

/// A document with its controllers mounted.
#[derive(Debug)]
pub struct Page {
    doc: Document,
    scheduler: Scheduler<Task>,
    layers: LayerRegistry,
    config: Config,
    selects: CustomSelects,
    overlay: Option<NavOverlay>,
    modal: Option<ReservationModal>,
    bottom_bar: Option<BottomBar>,
    header: Option<SiteHeader>,
    carousel: Option<Carousel>,
    touch_on_carousel: bool,
}

impl Page {
    /// Discovers every controller from the markup. Missing markup disables
    /// the matching feature.
    pub fn mount(mut doc: Document, config: Config) -> Result<Self> {
        config.validate().context("Invalid page configuration")?;
        let selects = CustomSelects::discover(&mut doc)?;
        let overlay = NavOverlay::discover(&doc)?;
        let modal = ReservationModal::discover(&mut doc)?;
        let bottom_bar = BottomBar::discover(&doc, &config)?;
        let header = SiteHeader::discover(&doc, config.header.hide_after_px);

        let mut page = Self {
            doc,
            scheduler: Scheduler::new(),
            layers: LayerRegistry::new(),
            config,
            selects,
            overlay,
            modal,
            bottom_bar,
            header,
            carousel: None,
            touch_on_carousel: false,
        };
        page.carousel = Carousel::discover(&mut cx!(page))?;
        tracing::debug!(
            "mounted page: overlay={} modal={} bottom_bar={} selects={} carousel={}",
            page.overlay.is_some(),
            page.modal.is_some(),
            page.bottom_bar.is_some(),
            page.selects.len(),
            page.carousel.is_some()
        );
        Ok(page)
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable document access for building scenarios.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open/closed state of the blocking layers.
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// The navigation overlay, if present.
    pub fn overlay(&self) -> Option<&NavOverlay> {
        self.overlay.as_ref()
    }

    /// The reservation dialog, if present.
    pub fn modal(&self) -> Option<&ReservationModal> {
        self.modal.as_ref()
    }

    /// The bottom bar, if present.
    pub fn bottom_bar(&self) -> Option<&BottomBar> {
        self.bottom_bar.as_ref()
    }

    /// The site header, if present.
    pub fn header(&self) -> Option<&SiteHeader> {
        self.header.as_ref()
    }

    /// The testimonial carousel, if present.
    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    /// The custom selects.
    pub fn custom_selects(&self) -> &CustomSelects {
        &self.selects
    }

    /// Virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// First element matching `selectors`.
    pub fn query(&self, selectors: &str) -> Result<NodeId> {
        match self.doc.query_selector(self.doc.root(), selectors)? {
            Some(node) => Ok(node),
            None => bail!("No element matches '{selectors}'"),
        }
    }

    /// `DOMContentLoaded`.
    pub fn load(&mut self) {
        if let Some(header) = self.header.as_mut() {
            header.on_scroll(&mut self.doc);
        }
        self.update_bottom_bar();
    }

    /// Moves focus, as a pointer or script would.
    pub fn focus(&mut self, target: NodeId) -> bool {
        self.doc.focus(target)
    }

    /// A click on `target`. Returns `true` when the default action was
    /// prevented.
    pub fn click(&mut self, target: NodeId) -> Result<bool> {
        tracing::debug!("click {}", self.doc.describe(target));
        let mut prevented = self.selects.handle_click(&mut self.doc, target)?;
        if let Some(overlay) = self.overlay.as_mut() {
            prevented |= overlay.handle_click(&mut cx!(self), target)?;
        }
        if let Some(modal) = self.modal.as_mut() {
            prevented |= modal.handle_click(&mut cx!(self), target)?;
        }
        if let Some(carousel) = self.carousel.as_mut() {
            carousel.handle_click(&mut cx!(self), target);
        }
        if self.doc.closest(target, ".site-header")?.is_some() {
            self.scheduler.set_timeout(0, Task::RecomputeBottomBar);
        }
        self.after_dispatch();
        Ok(prevented)
    }

    /// A key press on the focused element. Returns `true` when consumed.
    ///
    /// Open custom selects see the key first, then the carousel when it
    /// holds focus, then the topmost open layer.
    pub fn key_down(&mut self, event: KeyEvent) -> Result<bool> {
        tracing::debug!("key {} on {}", event.key, self.doc.describe(self.doc.active_element()));
        let mut consumed = self.selects.handle_key(&mut self.doc, &event)?;
        if !consumed {
            if let Some(carousel) = self.carousel.as_mut() {
                consumed = carousel.handle_key(&mut cx!(self), &event);
            }
        }
        if !consumed {
            consumed = match self.layers.topmost() {
                Some(LayerKind::Modal) => match self.modal.as_mut() {
                    Some(modal) => modal.handle_key(&mut cx!(self), &event)?,
                    None => false,
                },
                Some(LayerKind::NavOverlay) => match self.overlay.as_mut() {
                    Some(overlay) => overlay.handle_key(&mut cx!(self), &event)?,
                    None => false,
                },
                None => false,
            };
        }
        self.after_dispatch();
        Ok(consumed)
    }

    /// Window scroll to `y`.
    pub fn scroll_to(&mut self, y: f64) {
        self.doc.viewport.scroll_y = y.max(0.0);
        if self.header.is_some() {
            self.scheduler.request_animation_frame(Task::HeaderScroll);
        }
        self.update_bottom_bar();
    }

    /// Window resize.
    pub fn resize(&mut self, inner_width: f64, client_width: f64) {
        self.doc.viewport.inner_width = inner_width;
        self.doc.viewport.client_width = client_width;
        self.update_bottom_bar();
    }

    /// `visibilitychange`.
    pub fn visibility_change(&mut self) {
        self.update_bottom_bar();
    }

    /// Footer entered or left the viewport.
    pub fn footer_intersection(&mut self, in_view: bool) {
        if let Some(bar) = self.bottom_bar.as_mut() {
            bar.set_footer_in_view(&mut self.doc, in_view);
        }
    }

    /// User typed `value` into a form control.
    pub fn input(&mut self, target: NodeId, value: &str) {
        self.doc.set_value(target, value);
    }

    /// Form submission. Returns `None` when no controller handles `form`.
    pub fn submit(&mut self, form: NodeId) -> Result<Option<SubmitOutcome>> {
        let outcome = match self.modal.as_mut() {
            Some(modal) => modal.submit(&mut cx!(self), form)?,
            None => None,
        };
        self.after_dispatch();
        Ok(outcome)
    }

    /// `touchstart` at horizontal position `x`.
    pub fn touch_start(&mut self, target: NodeId, x: f64) {
        self.touch_on_carousel = false;
        if let Some(carousel) = self.carousel.as_mut() {
            if self.doc.contains(carousel.root(), target) {
                carousel.touch_start(x);
                self.touch_on_carousel = true;
            }
        }
    }

    /// `touchmove` to horizontal position `x`.
    pub fn touch_move(&mut self, x: f64) {
        if !self.touch_on_carousel {
            return;
        }
        if let Some(carousel) = self.carousel.as_mut() {
            carousel.touch_move(x);
        }
    }

    /// `touchend`. Returns `true` when it completed a swipe.
    pub fn touch_end(&mut self) -> bool {
        if !std::mem::take(&mut self.touch_on_carousel) {
            return false;
        }
        match self.carousel.as_mut() {
            Some(carousel) => carousel.touch_end(&mut cx!(self)),
            None => false,
        }
    }

    /// `transitionend` for `property` on `target`.
    pub fn transition_end(&mut self, target: NodeId, property: &str) -> bool {
        match self.overlay.as_mut() {
            Some(overlay) => overlay.on_transition_end(&mut self.doc, target, property),
            None => false,
        }
    }

    /// Moves the clock `ms` forward, firing due timers in order.
    pub fn advance(&mut self, ms: u64) -> Result<()> {
        let deadline = self.scheduler.now().saturating_add(ms);
        while let Some(task) = self.scheduler.pop_due(deadline) {
            self.run_task(task)?;
        }
        self.scheduler.advance_clock(deadline);
        Ok(())
    }

    /// Runs the callbacks queued for the next animation frame.
    pub fn run_animation_frame(&mut self) -> Result<()> {
        for task in self.scheduler.take_frame() {
            self.run_task(task)?;
        }
        Ok(())
    }

    /// Runs frames, completes transitions and fires timers until nothing
    /// is pending.
    pub fn settle(&mut self) -> Result<()> {
        for _ in 0..SETTLE_ROUNDS {
            let mut progressed = false;
            if self.scheduler.pending_frames() > 0 {
                self.run_animation_frame()?;
                progressed = true;
            }
            if let Some(overlay) = self.overlay.as_mut() {
                progressed |= overlay.finish_transitions(&mut self.doc);
            }
            if !progressed {
                if let Some(due) = self.scheduler.next_due() {
                    self.advance(due.saturating_sub(self.scheduler.now()))?;
                    progressed = true;
                }
            }
            if !progressed {
                return Ok(());
            }
        }
        bail!("Page did not settle after {SETTLE_ROUNDS} rounds")
    }

    /// Current state summary.
    pub fn snapshot(&self) -> Result<PageSnapshot> {
        let mut expanded_submenus = Vec::new();
        if let Some(overlay) = &self.overlay {
            for item in overlay.submenus().open_items() {
                if let Some(toggle) = self.doc.query_selector(item, ".overlay__link")? {
                    expanded_submenus.push(self.doc.text_content(toggle).trim().to_string());
                }
            }
        }
        let toast = self.modal.as_ref().and_then(|modal| {
            let toast = modal.toast();
            toast
                .is_visible(&self.doc)
                .then(|| toast.text(&self.doc))
                .flatten()
        });
        let invalid_fields = match &self.modal {
            Some(modal) => modal.invalid_fields(&self.doc)?,
            None => Vec::new(),
        };
        Ok(PageSnapshot {
            overlay: self.overlay.as_ref().map(NavOverlay::state),
            modal: self.modal.as_ref().map(ReservationModal::state),
            bottom_bar_visible: self
                .bottom_bar
                .as_ref()
                .is_some_and(|bar| bar.is_visible(&self.doc, &self.layers)),
            expanded_submenus,
            focused: self.doc.describe(self.doc.active_element()),
            toast,
            carousel_index: self.carousel.as_ref().map(Carousel::index),
            invalid_fields,
            scroll_y: self.doc.viewport.scroll_y,
            now_ms: self.scheduler.now(),
        })
    }

    fn run_task(&mut self, task: Task) -> Result<()> {
        match task {
            Task::CloseOverlay => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.on_close_timer(&mut cx!(self))?;
                }
            }
            Task::RecomputeBottomBar => self.update_bottom_bar(),
            Task::DismissToast => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.dismiss_toast(&mut self.doc);
                }
            }
            Task::SubmenuFrame(item) => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.on_submenu_frame(&mut self.doc, item);
                }
            }
            Task::CarouselContent(index) => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.on_content_frame(&mut cx!(self), index);
                }
            }
            Task::CarouselFadeIn => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.on_fade_in(&mut self.doc);
                }
            }
            Task::HeaderScroll => {
                if let Some(header) = self.header.as_mut() {
                    header.on_scroll(&mut self.doc);
                }
            }
        }
        self.after_dispatch();
        Ok(())
    }

    /// After a layer transition: hand a withheld focus target to the dialog
    /// and re-derive the bottom bar.
    fn after_dispatch(&mut self) {
        if !self.layers.take_dirty() {
            return;
        }
        if let Some(overlay) = self.overlay.as_mut() {
            if let Some(target) = overlay.take_deferred_restore() {
                match self.modal.as_mut() {
                    Some(modal) if modal.is_visible() => {
                        modal.adopt_restore_target(&self.doc, overlay.root(), target);
                    }
                    _ => {
                        self.doc.focus(target);
                    }
                }
            }
        }
        self.update_bottom_bar();
    }

    fn update_bottom_bar(&mut self) {
        if let Some(bar) = &self.bottom_bar {
            bar.update(&mut self.doc, &self.layers);
        }
    }
}
