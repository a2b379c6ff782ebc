//! Focusable-element discovery and the Tab focus trap.

use crate::dom::{Document, Key, KeyEvent, NodeId};

const FORM_CONTROLS: [&str; 4] = ["button", "input", "select", "textarea"];

/// Whether `node` can be reached with the Tab key.
///
/// Links need an `href`; form controls must be enabled (hidden inputs never
/// qualify); any element with a non-negative `tabindex` qualifies and a
/// negative one excludes. Elements inside an `inert` subtree are skipped.
pub fn is_focusable(doc: &Document, node: NodeId) -> bool {
    let Some(element) = doc.get(node) else {
        return false;
    };
    if !doc.is_connected(node) {
        return false;
    }
    let mut current = Some(node);
    while let Some(ancestor) = current {
        if doc.has_attribute(ancestor, "inert") {
            return false;
        }
        current = doc.parent(ancestor);
    }

    let is_control = FORM_CONTROLS.contains(&element.tag());
    if is_control && element.has_attribute("disabled") {
        return false;
    }
    if element.tag() == "input" && element.attribute("type") == Some("hidden") {
        return false;
    }
    if let Some(Ok(index)) = element.attribute("tabindex").map(|t| t.trim().parse::<i32>()) {
        return index >= 0;
    }
    is_control || (element.tag() == "a" && element.has_attribute("href"))
}

/// Keyboard-reachable elements under `root`, in document order.
pub fn focusable_elements(doc: &Document, root: NodeId) -> Vec<NodeId> {
    doc.descendants(root)
        .filter(|node| is_focusable(doc, *node))
        .collect()
}

/// Focuses the first focusable element under `root`.
pub fn focus_first(doc: &mut Document, root: NodeId) -> bool {
    match focusable_elements(doc, root).first() {
        Some(first) => doc.focus(*first),
        None => false,
    }
}

/// Confines Tab cycling to `root`.
///
/// Shift+Tab on the first focusable element wraps to the last, Tab on the
/// last wraps to the first, and Tab while focus sits outside `root` pulls it
/// back in. Returns `true` when focus was moved (the native Tab must be
/// suppressed); otherwise native order proceeds inside `root`.
pub fn trap_tab(doc: &mut Document, root: NodeId, event: &KeyEvent) -> bool {
    if event.key != Key::Tab {
        return false;
    }
    let focusable = focusable_elements(doc, root);
    let (Some(&first), Some(&last)) = (focusable.first(), focusable.last()) else {
        return false;
    };
    let active = doc.active_element();

    if !doc.contains(root, active) || active == root {
        return doc.focus(if event.shift { last } else { first });
    }
    if event.shift && active == first {
        return doc.focus(last);
    }
    if !event.shift && active == last {
        return doc.focus(first);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dialog {
        doc: Document,
        root: NodeId,
        first: NodeId,
        middle: NodeId,
        last: NodeId,
    }

    fn dialog() -> Dialog {
        let mut doc = Document::new();
        let body = doc.body();
        let root = doc.element(body, "div", &[("class", "modal"), ("tabindex", "-1")]);
        let first = doc.element(root, "input", &[("name", "date")]);
        doc.element(root, "input", &[("type", "hidden"), ("name", "time")]);
        doc.element(root, "button", &[("disabled", "")]);
        doc.element(root, "li", &[("tabindex", "-1")]);
        doc.element(root, "a", &[]);
        let middle = doc.element(root, "span", &[("tabindex", "0")]);
        let inert = doc.element(root, "div", &[("inert", "")]);
        doc.element(inert, "button", &[]);
        let last = doc.element(root, "a", &[("href", "#top")]);
        Dialog {
            doc,
            root,
            first,
            middle,
            last,
        }
    }

    #[test]
    fn test_focusable_elements_filters_unreachable() {
        let d = dialog();
        assert_eq!(
            focusable_elements(&d.doc, d.root),
            vec![d.first, d.middle, d.last]
        );
    }

    #[test]
    fn test_tab_on_last_wraps_to_first() {
        let mut d = dialog();
        d.doc.focus(d.last);
        assert!(trap_tab(&mut d.doc, d.root, &KeyEvent::new(Key::Tab)));
        assert_eq!(d.doc.active_element(), d.first);
    }

    #[test]
    fn test_shift_tab_on_first_wraps_to_last() {
        let mut d = dialog();
        d.doc.focus(d.first);
        assert!(trap_tab(&mut d.doc, d.root, &KeyEvent::shifted(Key::Tab)));
        assert_eq!(d.doc.active_element(), d.last);
    }

    #[test]
    fn test_tab_in_the_middle_is_native() {
        let mut d = dialog();
        d.doc.focus(d.middle);
        assert!(!trap_tab(&mut d.doc, d.root, &KeyEvent::new(Key::Tab)));
        assert!(!trap_tab(&mut d.doc, d.root, &KeyEvent::shifted(Key::Tab)));
        assert_eq!(d.doc.active_element(), d.middle);
    }

    #[test]
    fn test_tab_from_outside_is_pulled_inside() {
        let mut d = dialog();
        d.doc.blur();
        assert!(trap_tab(&mut d.doc, d.root, &KeyEvent::new(Key::Tab)));
        assert_eq!(d.doc.active_element(), d.first);

        d.doc.focus(d.root);
        assert!(trap_tab(&mut d.doc, d.root, &KeyEvent::shifted(Key::Tab)));
        assert_eq!(d.doc.active_element(), d.last);
    }

    #[test]
    fn test_non_tab_keys_are_ignored() {
        let mut d = dialog();
        d.doc.focus(d.last);
        assert!(!trap_tab(&mut d.doc, d.root, &KeyEvent::new(Key::Enter)));
        assert_eq!(d.doc.active_element(), d.last);
    }

    #[test]
    fn test_focus_first() {
        let mut d = dialog();
        assert!(focus_first(&mut d.doc, d.root));
        assert_eq!(d.doc.active_element(), d.first);
    }
}
