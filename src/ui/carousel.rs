//! Testimonial carousel.
//!
//! Changing slides fades the wrap out, swaps the content on the next
//! animation frame and fades back in on the frame after that.

use anyhow::Result;

use super::{Context, Task};
use crate::config::Testimonial;
use crate::dom::{Document, Key, KeyEvent, NodeId};

/// The `#testimonials` carousel.
#[derive(Debug, Clone)]
pub struct Carousel {
    root: NodeId,
    quote: Option<NodeId>,
    avatar: Option<NodeId>,
    name: Option<NodeId>,
    role: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    current: Option<NodeId>,
    slides: Vec<Testimonial>,
    index: usize,
    touch_start_x: f64,
    touch_dx: f64,
}

impl Carousel {
    /// Finds `#testimonials`, writes the slide total and renders the first
    /// slide. Returns `None` without markup or slides.
    pub fn discover(cx: &mut Context<'_>) -> Result<Option<Self>> {
        let Some(root) = cx.doc.get_element_by_id("testimonials") else {
            tracing::debug!("testimonials markup not found");
            return Ok(None);
        };
        let slides = cx.config.carousel.slides.clone();
        if slides.is_empty() {
            tracing::warn!("carousel disabled: no slides configured");
            return Ok(None);
        }
        let doc_root = cx.doc.root();
        let carousel = Self {
            root,
            quote: cx.doc.query_selector(root, ".testimonial p")?,
            avatar: cx.doc.query_selector(root, ".author__avatar")?,
            name: cx.doc.query_selector(root, ".author__name")?,
            role: cx.doc.query_selector(root, ".author__role")?,
            prev: cx.doc.query_selector(doc_root, ".testimonials__prev")?,
            next: cx.doc.query_selector(doc_root, ".testimonials__next")?,
            current: cx.doc.query_selector(doc_root, ".testimonials__counter .current")?,
            slides,
            index: 0,
            touch_start_x: 0.0,
            touch_dx: 0.0,
        };
        if let Some(total) = cx.doc.query_selector(doc_root, ".testimonials__counter .total")? {
            cx.doc.set_text(total, &carousel.slides.len().to_string());
        }
        carousel.render(cx);
        Ok(Some(carousel))
    }

    /// The `#testimonials` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Index of the current slide (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether there are no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Moves `delta` slides, wrapping at both ends, and starts the fade.
    pub fn advance(&mut self, cx: &mut Context<'_>, delta: isize) {
        self.index = wrap_index(self.index, delta, self.slides.len());
        tracing::debug!("carousel -> slide {}", self.index + 1);
        self.render(cx);
    }

    /// Prev/next button clicks. Returns `true` when a slide change started.
    pub fn handle_click(&mut self, cx: &mut Context<'_>, target: NodeId) -> bool {
        let hit = |button: Option<NodeId>| button.is_some_and(|b| cx.doc.contains(b, target));
        let delta = if hit(self.next) {
            1
        } else if hit(self.prev) {
            -1
        } else {
            return false;
        };
        self.advance(cx, delta);
        true
    }

    /// Left/right arrows while focus is inside the carousel.
    pub fn handle_key(&mut self, cx: &mut Context<'_>, event: &KeyEvent) -> bool {
        if !cx.doc.contains(self.root, cx.doc.active_element()) {
            return false;
        }
        match event.key {
            Key::ArrowRight => self.advance(cx, 1),
            Key::ArrowLeft => self.advance(cx, -1),
            _ => return false,
        }
        true
    }

    /// Touch began at `x`.
    pub fn touch_start(&mut self, x: f64) {
        self.touch_start_x = x;
        self.touch_dx = 0.0;
    }

    /// Touch moved to `x`.
    pub fn touch_move(&mut self, x: f64) {
        self.touch_dx = x - self.touch_start_x;
    }

    /// Touch ended. A swipe left past the threshold goes forward, a swipe
    /// right goes back. Returns `true` when the slide changed.
    pub fn touch_end(&mut self, cx: &mut Context<'_>) -> bool {
        let dx = self.touch_dx;
        self.touch_start_x = 0.0;
        self.touch_dx = 0.0;
        if dx.abs() <= cx.config.carousel.swipe_threshold_px {
            return false;
        }
        self.advance(cx, if dx < 0.0 { 1 } else { -1 });
        true
    }

    /// First animation frame: swap the content to slide `index`.
    pub fn on_content_frame(&mut self, cx: &mut Context<'_>, index: usize) {
        let Some(slide) = self.slides.get(index) else {
            return;
        };
        let texts = [
            (self.quote, &slide.text),
            (self.name, &slide.name),
            (self.role, &slide.role),
        ];
        for (node, text) in texts {
            if let Some(node) = node {
                cx.doc.set_text(node, text);
            }
        }
        if let Some(avatar) = self.avatar {
            cx.doc.set_attribute(avatar, "src", &slide.avatar);
            cx.doc.set_attribute(avatar, "alt", &slide.name);
        }
        if let Some(current) = self.current {
            cx.doc.set_text(current, &(index + 1).to_string());
        }
        cx.scheduler.request_animation_frame(Task::CarouselFadeIn);
    }

    /// Second animation frame: end the fade.
    pub fn on_fade_in(&mut self, doc: &mut Document) {
        doc.remove_class(self.root, "is-fading");
    }

    /// Whether a slide change is in progress.
    pub fn is_fading(&self, doc: &Document) -> bool {
        doc.has_class(self.root, "is-fading")
    }

    fn render(&self, cx: &mut Context<'_>) {
        cx.doc.add_class(self.root, "is-fading");
        cx.scheduler
            .request_animation_frame(Task::CarouselContent(self.index));
    }
}

/// `(index + delta) mod len`, always in `0..len`. Returns 0 for an empty
/// carousel.
///
/// ```
/// use bistro_ui::ui::carousel::wrap_index;
///
/// assert_eq!(wrap_index(2, 1, 3), 0);
/// assert_eq!(wrap_index(0, -1, 3), 2);
/// ```
pub fn wrap_index(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (index as isize + delta).rem_euclid(len) as usize
}
