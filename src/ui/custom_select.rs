//! Listbox widgets standing in for native `<select>` elements.
//!
//! Markup: `.custom-select[data-target]` wrapping a `.custom-select__button`
//! (with a `.custom-select__label`) and a `.custom-select__list` of
//! `.custom-select__option[data-value]` items. The chosen value lives in a
//! hidden input named by `data-target`.

use anyhow::Result;

use crate::dom::{Document, Key, KeyEvent, NodeId, ScrollBlock};

#[derive(Debug, Clone, Copy)]
struct SelectWrap {
    wrap: NodeId,
    button: NodeId,
    list: NodeId,
}

/// Every custom select on the page.
#[derive(Debug, Clone, Default)]
pub struct CustomSelects {
    wraps: Vec<SelectWrap>,
}

impl CustomSelects {
    /// Initialises each `.custom-select` once. Wraps lacking a button or a
    /// list are marked but left inert.
    pub fn discover(doc: &mut Document) -> Result<Self> {
        let root = doc.root();
        let mut wraps = Vec::new();
        for wrap in doc.query_selector_all(root, ".custom-select")? {
            if doc.has_attribute(wrap, "data-cs-init") {
                continue;
            }
            doc.set_attribute(wrap, "data-cs-init", "1");

            let button = doc.query_selector(wrap, ".custom-select__button")?;
            let list = doc.query_selector(wrap, ".custom-select__list")?;
            let (Some(button), Some(list)) = (button, list) else {
                tracing::debug!("custom select {} has no button or list", doc.describe(wrap));
                continue;
            };
            for option in options(doc, wrap)? {
                doc.set_attribute(option, "tabindex", "-1");
            }
            wraps.push(SelectWrap { wrap, button, list });
        }
        Ok(Self { wraps })
    }

    /// Number of initialised selects.
    pub fn len(&self) -> usize {
        self.wraps.len()
    }

    /// Whether the page has no usable selects.
    pub fn is_empty(&self) -> bool {
        self.wraps.is_empty()
    }

    /// Whether the select rooted at `wrap` is open.
    pub fn is_open(&self, doc: &Document, wrap: NodeId) -> bool {
        doc.attribute(wrap, "aria-expanded") == Some("true")
    }

    /// The open select, if any.
    pub fn open_wrap(&self, doc: &Document) -> Option<NodeId> {
        self.wraps
            .iter()
            .map(|w| w.wrap)
            .find(|wrap| self.is_open(doc, *wrap))
    }

    /// Opens `wrap`, closing the others, and focuses the selected option.
    pub fn open(&self, doc: &mut Document, wrap: NodeId) -> Result<()> {
        let Some(select) = self.find(wrap) else {
            return Ok(());
        };
        if self.is_open(doc, wrap) {
            return Ok(());
        }
        self.close_all(doc, Some(wrap));
        doc.set_attribute(wrap, "aria-expanded", "true");
        doc.set_attribute(select.button, "aria-expanded", "true");

        let selected = doc.query_selector(wrap, ".custom-select__option[aria-selected=\"true\"]")?;
        let target = match selected {
            Some(option) => Some(option),
            None => options(doc, wrap)?.first().copied(),
        };
        if let Some(option) = target {
            doc.focus(option);
            doc.scroll_into_view(option, ScrollBlock::Nearest, false);
        }
        Ok(())
    }

    /// Closes `wrap`.
    pub fn close(&self, doc: &mut Document, wrap: NodeId) {
        let Some(select) = self.find(wrap) else {
            return;
        };
        if doc.attribute(wrap, "aria-expanded") == Some("false") {
            return;
        }
        doc.set_attribute(wrap, "aria-expanded", "false");
        doc.set_attribute(select.button, "aria-expanded", "false");
    }

    /// Closes every select other than `except`.
    pub fn close_all(&self, doc: &mut Document, except: Option<NodeId>) {
        for select in &self.wraps {
            if Some(select.wrap) != except {
                self.close(doc, select.wrap);
            }
        }
    }

    /// Makes `option` the selection of `wrap`, writes the hidden input and
    /// the label, closes the list and focuses the button.
    pub fn select(&self, doc: &mut Document, wrap: NodeId, option: NodeId) -> Result<()> {
        let Some(select) = self.find(wrap) else {
            return Ok(());
        };
        for other in options(doc, wrap)? {
            doc.remove_attribute(other, "aria-selected");
        }
        doc.set_attribute(option, "aria-selected", "true");

        let text = doc.text_content(option).trim().to_string();
        let value = option_value(doc, option);
        if let Some(name) = doc.attribute(wrap, "data-target").map(str::to_string) {
            let scope = doc.closest(wrap, "form")?.unwrap_or(doc.root());
            if let Some(hidden) = hidden_input(doc, scope, &name)? {
                doc.set_value(hidden, &value);
            }
        }
        if let Some(label) = doc.query_selector(wrap, ".custom-select__label")? {
            doc.set_text(label, &text);
        }
        self.close(doc, wrap);
        doc.focus(select.button);
        tracing::debug!("custom select {} = {value:?}", doc.describe(wrap));
        Ok(())
    }

    /// Click routing. Returns `true` when the click was a button toggle.
    pub fn handle_click(&self, doc: &mut Document, target: NodeId) -> Result<bool> {
        let mut consumed = false;
        if let Some(select) = self.containing(doc, target) {
            if doc.contains(select.button, target) {
                if self.is_open(doc, select.wrap) {
                    self.close(doc, select.wrap);
                } else {
                    self.open(doc, select.wrap)?;
                }
                consumed = true;
            } else if doc.contains(select.list, target) {
                if let Some(option) = doc.closest(target, ".custom-select__option")? {
                    self.select(doc, select.wrap, option)?;
                }
            }
        }
        if let Some(open) = self.open_wrap(doc) {
            if !doc.contains(open, target) {
                self.close(doc, open);
            }
        }
        Ok(consumed)
    }

    /// Keyboard routing for the focused element. Returns `true` when the
    /// key was consumed; an `Escape` counts as consumed only if it closed
    /// a select.
    pub fn handle_key(&self, doc: &mut Document, event: &KeyEvent) -> Result<bool> {
        let active = doc.active_element();
        let mut closed_any = false;

        if let Some(select) = self.containing(doc, active) {
            if active == select.button {
                match event.key {
                    Key::ArrowDown | Key::ArrowUp | Key::Space | Key::Enter => {
                        self.open(doc, select.wrap)?;
                        return Ok(true);
                    }
                    Key::Escape => {
                        closed_any = self.is_open(doc, select.wrap);
                        self.close(doc, select.wrap);
                    }
                    _ => {}
                }
            } else if doc.contains(select.list, active) {
                match event.key {
                    Key::ArrowDown | Key::ArrowUp | Key::Home | Key::End => {
                        self.move_focus(doc, select.wrap, &event.key)?;
                        return Ok(true);
                    }
                    Key::Enter | Key::Space => {
                        if let Some(option) = doc.closest(active, ".custom-select__option")? {
                            self.select(doc, select.wrap, option)?;
                        }
                        return Ok(true);
                    }
                    Key::Escape => {
                        closed_any = self.is_open(doc, select.wrap);
                        self.close(doc, select.wrap);
                        doc.focus(select.button);
                    }
                    Key::Tab => {
                        self.close(doc, select.wrap);
                        return Ok(false);
                    }
                    _ => {}
                }
            }
        }

        if event.key == Key::Escape {
            if let Some(open) = self.open_wrap(doc) {
                self.close(doc, open);
                if let Some(select) = self.find(open) {
                    doc.focus(select.button);
                }
                closed_any = true;
            }
        }
        Ok(closed_any)
    }

    fn move_focus(&self, doc: &mut Document, wrap: NodeId, key: &Key) -> Result<()> {
        let opts = options(doc, wrap)?;
        let Some(last) = opts.len().checked_sub(1) else {
            return Ok(());
        };
        let active = doc.active_element();
        let current = opts.iter().position(|o| *o == active).or_else(|| {
            opts.iter()
                .position(|o| doc.attribute(*o, "aria-selected") == Some("true"))
        });
        let index = match key {
            Key::ArrowDown => current.map_or(0, |i| (i + 1).min(last)),
            Key::ArrowUp => current.map_or(0, |i| i.saturating_sub(1)),
            Key::Home => 0,
            _ => last,
        };
        doc.focus(opts[index]);
        doc.scroll_into_view(opts[index], ScrollBlock::Nearest, false);
        Ok(())
    }

    fn find(&self, wrap: NodeId) -> Option<SelectWrap> {
        self.wraps.iter().copied().find(|w| w.wrap == wrap)
    }

    fn containing(&self, doc: &Document, node: NodeId) -> Option<SelectWrap> {
        self.wraps
            .iter()
            .copied()
            .find(|w| doc.contains(w.wrap, node))
    }
}

/// Points the select bound to `name` under `root` at `value`.
///
/// Options match on their value (`data-value`, else trimmed text); an empty
/// value never matches. The label shows the match, else `fallback_label`,
/// else the first option. The hidden input receives the matched value, else
/// the raw value, else the first option's value.
pub fn set_value(
    doc: &mut Document,
    root: NodeId,
    name: &str,
    value: &str,
    fallback_label: Option<&str>,
) -> Result<()> {
    let Some(wrap) = doc
        .query_selector_all(root, ".custom-select[data-target]")?
        .into_iter()
        .find(|wrap| doc.attribute(*wrap, "data-target") == Some(name))
    else {
        return Ok(());
    };
    let hidden = hidden_input(doc, root, name)?;
    let label = doc.query_selector(wrap, ".custom-select__label")?;
    let opts = options(doc, wrap)?;

    let mut used = None;
    for option in &opts {
        let is_match = !value.is_empty() && option_value(doc, *option) == value;
        if is_match {
            doc.set_attribute(*option, "aria-selected", "true");
            used = Some(*option);
        } else {
            doc.remove_attribute(*option, "aria-selected");
        }
    }

    let first = opts.first().copied();
    let text = match (used, fallback_label.filter(|l| !l.is_empty())) {
        (Some(option), _) => doc.text_content(option).trim().to_string(),
        (None, Some(fallback)) => fallback.to_string(),
        (None, None) => first.map_or_else(String::new, |o| doc.text_content(o).trim().to_string()),
    };
    if let Some(hidden) = hidden {
        let hidden_value = match used {
            Some(option) => option_value(doc, option),
            None if !value.is_empty() => value.to_string(),
            None => first
                .and_then(|o| doc.attribute(o, "data-value"))
                .unwrap_or_default()
                .to_string(),
        };
        doc.set_value(hidden, &hidden_value);
    }
    if let Some(label) = label {
        doc.set_text(label, &text);
    }
    Ok(())
}

fn options(doc: &Document, wrap: NodeId) -> Result<Vec<NodeId>> {
    doc.query_selector_all(wrap, ".custom-select__option")
}

fn option_value(doc: &Document, option: NodeId) -> String {
    match doc.attribute(option, "data-value") {
        Some(value) => value.to_string(),
        None => doc.text_content(option).trim().to_string(),
    }
}

fn hidden_input(doc: &Document, scope: NodeId, name: &str) -> Result<Option<NodeId>> {
    Ok(doc
        .query_selector_all(scope, "input[type=\"hidden\"]")?
        .into_iter()
        .find(|input| doc.attribute(*input, "name") == Some(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Form {
        doc: Document,
        selects: CustomSelects,
        wrap: NodeId,
        button: NodeId,
        label: NodeId,
        hidden: NodeId,
        options: Vec<NodeId>,
        other_wrap: NodeId,
        outside: NodeId,
    }

    fn select_markup(doc: &mut Document, form: NodeId, name: &str, values: &[&str]) -> NodeId {
        doc.element(form, "input", &[("type", "hidden"), ("name", name)]);
        let wrap = doc.element(
            form,
            "div",
            &[("class", "custom-select"), ("data-target", name), ("aria-expanded", "false")],
        );
        let button = doc.element(
            wrap,
            "button",
            &[("class", "custom-select__button"), ("type", "button"), ("aria-expanded", "false")],
        );
        doc.text_element(button, "span", &[("class", "custom-select__label")], "Pick");
        let list = doc.element(wrap, "ul", &[("class", "custom-select__list"), ("role", "listbox")]);
        for value in values {
            doc.text_element(
                list,
                "li",
                &[("class", "custom-select__option"), ("data-value", *value)],
                &format!(" {value} "),
            );
        }
        wrap
    }

    fn form() -> Form {
        let mut doc = Document::new();
        let body = doc.body();
        let form = doc.element(body, "form", &[("class", "modal__form")]);
        let wrap = select_markup(&mut doc, form, "time", &["18:00", "19:00", "20:00"]);
        let other_wrap = select_markup(&mut doc, form, "persons", &["2", "4"]);
        let outside = doc.element(body, "p", &[]);
        let selects = CustomSelects::discover(&mut doc).unwrap();

        let button = doc.query_selector(wrap, ".custom-select__button").unwrap().unwrap();
        let label = doc.query_selector(wrap, ".custom-select__label").unwrap().unwrap();
        let hidden = doc.query_selector(form, "input[name=\"time\"]").unwrap().unwrap();
        let options = doc.query_selector_all(wrap, ".custom-select__option").unwrap();
        Form {
            doc,
            selects,
            wrap,
            button,
            label,
            hidden,
            options,
            other_wrap,
            outside,
        }
    }

    #[test]
    fn test_discover_initialises_once() {
        let mut f = form();
        assert_eq!(f.selects.len(), 2);
        assert_eq!(f.doc.attribute(f.options[0], "tabindex"), Some("-1"));
        assert!(CustomSelects::discover(&mut f.doc).unwrap().is_empty());
    }

    #[test]
    fn test_button_click_toggles_and_focuses_first_option() {
        let mut f = form();
        assert!(f.selects.handle_click(&mut f.doc, f.button).unwrap());
        assert!(f.selects.is_open(&f.doc, f.wrap));
        assert_eq!(f.doc.attribute(f.button, "aria-expanded"), Some("true"));
        assert_eq!(f.doc.active_element(), f.options[0]);

        assert!(f.selects.handle_click(&mut f.doc, f.button).unwrap());
        assert!(!f.selects.is_open(&f.doc, f.wrap));
    }

    #[test]
    fn test_opening_one_closes_the_other() {
        let mut f = form();
        f.selects.open(&mut f.doc, f.other_wrap).unwrap();
        f.selects.open(&mut f.doc, f.wrap).unwrap();
        assert_eq!(f.selects.open_wrap(&f.doc), Some(f.wrap));
        assert!(!f.selects.is_open(&f.doc, f.other_wrap));
    }

    #[test]
    fn test_option_click_selects_value() {
        let mut f = form();
        f.selects.open(&mut f.doc, f.wrap).unwrap();
        f.selects.handle_click(&mut f.doc, f.options[1]).unwrap();

        assert_eq!(f.doc.value(f.hidden), "19:00");
        assert_eq!(f.doc.text_content(f.label), "19:00");
        assert_eq!(f.doc.attribute(f.options[1], "aria-selected"), Some("true"));
        assert!(!f.selects.is_open(&f.doc, f.wrap));
        assert_eq!(f.doc.active_element(), f.button);
    }

    #[test]
    fn test_list_keys_clamp_and_select() {
        let mut f = form();
        f.doc.focus(f.button);
        assert!(f
            .selects
            .handle_key(&mut f.doc, &KeyEvent::new(Key::ArrowDown))
            .unwrap());
        assert_eq!(f.doc.active_element(), f.options[0]);

        f.selects.handle_key(&mut f.doc, &KeyEvent::new(Key::ArrowUp)).unwrap();
        assert_eq!(f.doc.active_element(), f.options[0]);
        f.selects.handle_key(&mut f.doc, &KeyEvent::new(Key::End)).unwrap();
        f.selects.handle_key(&mut f.doc, &KeyEvent::new(Key::ArrowDown)).unwrap();
        assert_eq!(f.doc.active_element(), f.options[2]);

        f.selects.handle_key(&mut f.doc, &KeyEvent::new(Key::Enter)).unwrap();
        assert_eq!(f.doc.value(f.hidden), "20:00");
        assert_eq!(f.doc.active_element(), f.button);
    }

    #[test]
    fn test_escape_is_consumed_only_when_it_closes() {
        let mut f = form();
        f.doc.focus(f.outside);
        assert!(!f
            .selects
            .handle_key(&mut f.doc, &KeyEvent::new(Key::Escape))
            .unwrap());

        f.selects.open(&mut f.doc, f.wrap).unwrap();
        assert!(f
            .selects
            .handle_key(&mut f.doc, &KeyEvent::new(Key::Escape))
            .unwrap());
        assert!(!f.selects.is_open(&f.doc, f.wrap));
        assert_eq!(f.doc.active_element(), f.button);
    }

    #[test]
    fn test_tab_closes_without_consuming() {
        let mut f = form();
        f.selects.open(&mut f.doc, f.wrap).unwrap();
        assert!(!f.selects.handle_key(&mut f.doc, &KeyEvent::new(Key::Tab)).unwrap());
        assert!(!f.selects.is_open(&f.doc, f.wrap));
    }

    #[test]
    fn test_click_outside_closes() {
        let mut f = form();
        f.selects.open(&mut f.doc, f.wrap).unwrap();
        assert!(!f.selects.handle_click(&mut f.doc, f.outside).unwrap());
        assert!(!f.selects.is_open(&f.doc, f.wrap));
    }

    #[test]
    fn test_set_value_matches_by_value() {
        let mut f = form();
        let root = f.doc.body();
        set_value(&mut f.doc, root, "time", "19:00", Some("Select time")).unwrap();
        assert_eq!(f.doc.value(f.hidden), "19:00");
        assert_eq!(f.doc.text_content(f.label), "19:00");
        assert_eq!(f.doc.attribute(f.options[1], "aria-selected"), Some("true"));
    }

    #[test]
    fn test_set_value_falls_back() {
        let mut f = form();
        let root = f.doc.body();
        set_value(&mut f.doc, root, "time", "", Some("Select time")).unwrap();
        assert_eq!(f.doc.text_content(f.label), "Select time");
        assert_eq!(f.doc.value(f.hidden), "18:00");

        set_value(&mut f.doc, root, "time", "23:30", None).unwrap();
        assert_eq!(f.doc.text_content(f.label), "18:00");
        assert_eq!(f.doc.value(f.hidden), "23:30");
        assert!(f
            .options
            .iter()
            .all(|o| !f.doc.has_attribute(*o, "aria-selected")));
    }
}
