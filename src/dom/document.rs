//! Element arena, focus, and viewport state.

use anyhow::{anyhow, Result};
use indextree::Arena;
use smallvec::SmallVec;

use super::selector::Selector;
use super::NodeId;

/// Inline `height` of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Height {
    /// `height: auto`, the element takes its natural height
    Auto,
    /// Fixed pixel height
    Px(f32),
}

/// The inline style properties the controllers write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    /// Inline height; `None` leaves it to the stylesheet (collapsed panels)
    pub height: Option<Height>,
    /// Inline `padding-right` in pixels (scrollbar compensation on `<body>`)
    pub padding_right: Option<f32>,
}

/// A single element. The class list is kept apart from the attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: String,
    classes: SmallVec<[String; 4]>,
    attributes: SmallVec<[(String, String); 4]>,
    /// Current value of a form control
    pub value: String,
    /// Text owned directly by the element
    pub text: String,
    /// Inline style
    pub style: Style,
    /// Height the element would take with `height: auto` (its scroll height)
    pub natural_height: f32,
}

impl Element {
    /// Creates an element with a lowercase tag name.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Lowercase tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the attribute value, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the attribute is present (regardless of its value).
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    /// Sets an attribute. `class` replaces the class list and `value`
    /// initialises the control value.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "class" => {
                self.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "value" => self.value = value.to_string(),
            _ => {
                if let Some(slot) = self.attributes.iter_mut().find(|(key, _)| *key == name) {
                    slot.1 = value.to_string();
                } else {
                    self.attributes.push((name, value.to_string()));
                }
            }
        }
    }

    /// Removes an attribute if present.
    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(key, _)| key != name);
    }

    /// Whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Adds a class if missing.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    /// Removes a class if present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Class list in insertion order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Height the element currently renders at.
    pub fn rendered_height(&self) -> f32 {
        match self.style.height {
            Some(Height::Px(px)) => px,
            Some(Height::Auto) => self.natural_height,
            None => 0.0,
        }
    }
}

/// Window scroll and width metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Vertical scroll offset (`window.scrollY`)
    pub scroll_y: f64,
    /// Window width including the scrollbar (`window.innerWidth`)
    pub inner_width: f64,
    /// Document width without the scrollbar (`documentElement.clientWidth`)
    pub client_width: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_y: 0.0,
            inner_width: 1280.0,
            client_width: 1280.0,
        }
    }
}

impl Viewport {
    /// Width taken by the vertical scrollbar.
    pub fn scrollbar_width(&self) -> f64 {
        (self.inner_width - self.client_width).max(0.0)
    }
}

/// Vertical alignment for [`Document::scroll_into_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    /// Center the element in the viewport
    Center,
    /// Scroll the minimum amount needed
    Nearest,
}

/// A scroll the page asked the browser to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollRequest {
    /// `element.scrollIntoView(...)`
    IntoView {
        /// Element to reveal
        node: NodeId,
        /// Alignment
        block: ScrollBlock,
        /// Smooth scrolling requested
        smooth: bool,
    },
    /// `window.scrollTo(...)`
    To {
        /// Target offset
        top: f64,
        /// Smooth scrolling requested
        smooth: bool,
    },
}

/// The document: `<html>` with a `<body>`, the focused element and the viewport.
#[derive(Debug)]
pub struct Document {
    arena: Arena<Element>,
    root: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    /// Scroll and width metrics
    pub viewport: Viewport,
    scroll_requests: Vec<ScrollRequest>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty `<html><body></body></html>` document.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(Element::new("html"));
        let body = arena.new_node(Element::new("body"));
        root.append(body, &mut arena);
        Self {
            arena,
            root,
            body,
            focused: None,
            viewport: Viewport::default(),
            scroll_requests: Vec::new(),
        }
    }

    /// The `<html>` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(Element::new(tag))
    }

    /// Appends `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        parent
            .checked_append(child, &mut self.arena)
            .map_err(|e| anyhow!("Failed to append {:?} to {:?}: {}", child, parent, e))
    }

    /// Builder shortcut: creates `<tag attrs...>` under `parent` and returns it.
    pub fn element(&mut self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        if let Some(element) = self.get_mut(node) {
            for (name, value) in attributes {
                element.set_attribute(name, value);
            }
        }
        if let Err(e) = self.append_child(parent, node) {
            tracing::warn!("{e}");
        }
        node
    }

    /// Builder shortcut: like [`Document::element`] with text content.
    pub fn text_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> NodeId {
        let node = self.element(parent, tag, attributes);
        self.set_text(node, text);
        node
    }

    /// Removes `node` (and its subtree) from its parent. The nodes stay
    /// addressable but are no longer connected.
    pub fn detach(&mut self, node: NodeId) {
        if self.get(node).is_some() {
            node.detach(&mut self.arena);
        }
    }

    /// Element data, or `None` for a removed node.
    pub fn get(&self, node: NodeId) -> Option<&Element> {
        if node.is_removed(&self.arena) {
            return None;
        }
        self.arena.get(node).map(indextree::Node::get)
    }

    /// Mutable element data, or `None` for a removed node.
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        if node.is_removed(&self.arena) {
            return None;
        }
        self.arena.get_mut(node).map(indextree::Node::get_mut)
    }

    /// Parent element.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?;
        self.arena.get(node).and_then(indextree::Node::parent)
    }

    /// Child elements in order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if self.get(node).is_none() {
            return Vec::new();
        }
        node.children(&self.arena).collect()
    }

    /// Whether `node` is attached to this document's tree.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.get(node).is_some() && node.ancestors(&self.arena).any(|a| a == self.root)
    }

    /// Inclusive containment: `ancestor == node` counts.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.get(node).is_some() && node.ancestors(&self.arena).any(|a| a == ancestor)
    }

    /// Attribute value of `node`.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).and_then(|e| e.attribute(name))
    }

    /// Whether `node` carries the attribute.
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get(node).is_some_and(|e| e.has_attribute(name))
    }

    /// Sets an attribute on `node`.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.get_mut(node) {
            element.set_attribute(name, value);
        }
    }

    /// Removes an attribute from `node`.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.get_mut(node) {
            element.remove_attribute(name);
        }
    }

    /// Whether `node` has the class.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node).is_some_and(|e| e.has_class(class))
    }

    /// Adds a class to `node`.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.get_mut(node) {
            element.add_class(class);
        }
    }

    /// Removes a class from `node`.
    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.get_mut(node) {
            element.remove_class(class);
        }
    }

    /// `classList.toggle(class, on)`.
    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    /// Control value of `node` (empty for unknown nodes).
    pub fn value(&self, node: NodeId) -> &str {
        self.get(node).map_or("", |e| e.value.as_str())
    }

    /// Sets the control value of `node`.
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(element) = self.get_mut(node) {
            element.value = value.to_string();
        }
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        if self.get(node).is_none() {
            return String::new();
        }
        node.descendants(&self.arena)
            .filter_map(|n| self.get(n))
            .map(|e| e.text.as_str())
            .collect()
    }

    /// Replaces the text owned by `node`.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(element) = self.get_mut(node) {
            element.text = text.to_string();
        }
    }

    /// Moves focus to `node`. Returns `false` when the node is not connected.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.is_connected(node) {
            return false;
        }
        self.focused = Some(node);
        true
    }

    /// Drops focus back to the body.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// `document.activeElement`: the focused element, or the body.
    pub fn active_element(&self) -> NodeId {
        self.focused
            .filter(|node| self.is_connected(*node))
            .unwrap_or(self.body)
    }

    /// First element with the given id.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.root
            .descendants(&self.arena)
            .find(|node| self.attribute(*node, "id") == Some(id))
    }

    /// First descendant of `root` matching `selectors`.
    pub fn query_selector(&self, root: NodeId, selectors: &str) -> Result<Option<NodeId>> {
        let selector = Selector::parse(selectors)?;
        Ok(self.descendants(root).find(|node| selector.matches(self, *node, Some(root))))
    }

    /// All descendants of `root` matching `selectors`, in document order.
    pub fn query_selector_all(&self, root: NodeId, selectors: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selectors)?;
        Ok(self
            .descendants(root)
            .filter(|node| selector.matches(self, *node, Some(root)))
            .collect())
    }

    /// Nearest inclusive ancestor of `node` matching `selectors`.
    pub fn closest(&self, node: NodeId, selectors: &str) -> Result<Option<NodeId>> {
        let selector = Selector::parse(selectors)?;
        if self.get(node).is_none() {
            return Ok(None);
        }
        Ok(node
            .ancestors(&self.arena)
            .find(|ancestor| selector.matches(self, *ancestor, None)))
    }

    /// Whether `node` matches `selectors`.
    pub fn matches(&self, node: NodeId, selectors: &str) -> Result<bool> {
        Ok(Selector::parse(selectors)?.matches(self, node, None))
    }

    /// Descendants of `root` in document order, excluding `root` itself.
    pub fn descendants(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let valid = self.get(root).is_some();
        root.descendants(&self.arena)
            .skip(1)
            .filter(move |_| valid)
    }

    /// Records an `element.scrollIntoView(...)` request.
    pub fn scroll_into_view(&mut self, node: NodeId, block: ScrollBlock, smooth: bool) {
        self.scroll_requests.push(ScrollRequest::IntoView {
            node,
            block,
            smooth,
        });
    }

    /// Records a `window.scrollTo(...)` request and applies the offset.
    pub fn scroll_to(&mut self, top: f64, smooth: bool) {
        self.viewport.scroll_y = top.max(0.0);
        self.scroll_requests.push(ScrollRequest::To { top, smooth });
    }

    /// Every scroll request made so far.
    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scroll_requests
    }

    /// Short human-readable label such as `button#menu.overlay__close`.
    pub fn describe(&self, node: NodeId) -> String {
        let Some(element) = self.get(node) else {
            return "<removed>".to_string();
        };
        let mut label = element.tag().to_string();
        if let Some(id) = element.attribute("id") {
            label.push('#');
            label.push_str(id);
        }
        for class in element.classes() {
            label.push('.');
            label.push_str(class);
        }
        if label == element.tag() {
            if let Some(name) = element.attribute("name") {
                label.push_str(&format!("[name={name}]"));
            } else if let Some(href) = element.attribute("href") {
                label.push_str(&format!("[href={href}]"));
            }
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_focuses_body() {
        let doc = Document::new();
        assert_eq!(doc.active_element(), doc.body());
        assert!(doc.is_connected(doc.body()));
    }

    #[test]
    fn test_class_attribute_populates_class_list() {
        let mut doc = Document::new();
        let body = doc.body();
        let node = doc.element(body, "DIV", &[("class", "a  b"), ("id", "x")]);
        assert!(doc.has_class(node, "a"));
        assert!(doc.has_class(node, "b"));
        assert_eq!(doc.get(node).unwrap().tag(), "div");
        assert_eq!(doc.describe(node), "div#x.a.b");
        doc.toggle_class(node, "a", false);
        assert!(!doc.has_class(node, "a"));
    }

    #[test]
    fn test_focus_ignores_detached_elements() {
        let mut doc = Document::new();
        let body = doc.body();
        let button = doc.element(body, "button", &[]);
        assert!(doc.focus(button));
        assert_eq!(doc.active_element(), button);

        doc.detach(button);
        assert!(!doc.is_connected(button));
        assert_eq!(doc.active_element(), doc.body());
        assert!(!doc.focus(button));
    }

    #[test]
    fn test_query_selector_all_is_document_order_and_excludes_root() {
        let mut doc = Document::new();
        let body = doc.body();
        let list = doc.element(body, "ul", &[("class", "item")]);
        let first = doc.element(list, "li", &[("class", "item")]);
        let nested = doc.element(first, "span", &[("class", "item")]);
        let second = doc.element(list, "li", &[("class", "item")]);

        let found = doc.query_selector_all(list, ".item").unwrap();
        assert_eq!(found, vec![first, nested, second]);
        assert_eq!(doc.query_selector(body, ".item").unwrap(), Some(list));
    }

    #[test]
    fn test_closest_is_inclusive() {
        let mut doc = Document::new();
        let body = doc.body();
        let item = doc.element(body, "li", &[("class", "overlay__item")]);
        let link = doc.element(item, "a", &[("href", "#")]);
        assert_eq!(doc.closest(link, ".overlay__item").unwrap(), Some(item));
        assert_eq!(doc.closest(link, "a[href]").unwrap(), Some(link));
        assert_eq!(doc.closest(link, ".missing").unwrap(), None);
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let mut doc = Document::new();
        let body = doc.body();
        let option = doc.text_element(body, "li", &[], " 2 ");
        doc.text_element(option, "small", &[], "persons");
        assert_eq!(doc.text_content(option), " 2 persons");
    }

    #[test]
    fn test_rendered_height_follows_inline_style() {
        let mut element = Element::new("ul");
        element.natural_height = 96.0;
        assert_eq!(element.rendered_height(), 0.0);
        element.style.height = Some(Height::Auto);
        assert_eq!(element.rendered_height(), 96.0);
        element.style.height = Some(Height::Px(40.0));
        assert_eq!(element.rendered_height(), 40.0);
    }

    #[test]
    fn test_scroll_to_moves_viewport() {
        let mut doc = Document::new();
        doc.scroll_to(340.0, true);
        assert_eq!(doc.viewport.scroll_y, 340.0);
        assert_eq!(
            doc.scroll_requests(),
            &[ScrollRequest::To {
                top: 340.0,
                smooth: true
            }]
        );
    }
}
