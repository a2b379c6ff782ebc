//! Built-in restaurant landing page.
//!
//! The CLI replays scripts against it and the integration tests drive it.
//! Element heights that a browser would measure are seeded here.

use crate::dom::{Document, NodeId};

const TIME_SLOTS: [&str; 10] = [
    "12:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00", "19:00", "20:00", "21:00",
];

const PARTY_SIZES: [(&str, &str); 6] = [
    ("1", "1 person"),
    ("2", "2 persons"),
    ("3", "3 persons"),
    ("4", "4 persons"),
    ("5", "5 persons"),
    ("6", "6 persons"),
];

/// Height of one submenu entry, used to seed the panels' natural height.
const SUBMENU_ROW_PX: f32 = 48.0;

/// Builds the landing page: header with burger, navigation overlay with two
/// submenus, hero, inline reservation form, testimonials, bottom bar,
/// footer and the reservation dialog.
pub fn restaurant_page() -> Document {
    let mut doc = Document::new();
    let body = doc.body();

    site_header(&mut doc, body);
    nav_overlay(&mut doc, body);

    let main = doc.element(body, "main", &[("id", "top")]);
    let hero = doc.element(main, "section", &[("class", "hero"), ("id", "hero")]);
    doc.text_element(hero, "h1", &[("class", "hero__title")], "Seasonal kitchen");
    doc.text_element(
        hero,
        "button",
        &[("class", "btn hero__cta js-reserve"), ("type", "button")],
        "Book a table",
    );

    let section = doc.element(main, "section", &[("class", "reservation"), ("id", "reservation")]);
    let form = doc.element(section, "form", &[("class", "reservation__form")]);
    reservation_fields(&mut doc, form, false);
    doc.text_element(
        form,
        "button",
        &[("class", "btn reservation__submit js-reserve"), ("type", "button")],
        "Reserve",
    );

    testimonials(&mut doc, main);

    let bar = doc.element(
        body,
        "div",
        &[("class", "bottom-bar"), ("id", "bottom-bar"), ("data-threshold", "120")],
    );
    doc.text_element(bar, "a", &[("class", "bottom-bar__call"), ("href", "tel:+15551234567")], "Call");
    doc.text_element(
        bar,
        "button",
        &[("class", "bottom-bar__reserve js-reserve"), ("type", "button")],
        "Reserve",
    );

    let footer = doc.element(body, "footer", &[("class", "footer")]);
    doc.text_element(footer, "a", &[("href", "#top")], "Back to top");

    reservation_modal(&mut doc, body);
    doc
}

fn site_header(doc: &mut Document, body: NodeId) {
    let header = doc.element(body, "header", &[("class", "site-header"), ("data-header", "")]);
    doc.text_element(header, "a", &[("class", "logo"), ("href", "#top")], "Bistro");
    doc.element(
        header,
        "button",
        &[
            ("class", "nav-toggle"),
            ("type", "button"),
            ("aria-controls", "nav-overlay"),
            ("aria-expanded", "false"),
            ("aria-label", "Open menu"),
        ],
    );
}

fn nav_overlay(doc: &mut Document, body: NodeId) {
    let overlay = doc.element(
        body,
        "div",
        &[("class", "overlay"), ("id", "nav-overlay"), ("aria-hidden", "true")],
    );
    doc.element(
        overlay,
        "button",
        &[("class", "overlay__close"), ("type", "button"), ("aria-label", "Close menu")],
    );
    let nav = doc.element(overlay, "nav", &[("class", "overlay__nav")]);
    let list = doc.element(nav, "ul", &[("class", "overlay__list")]);

    nav_link(doc, list, "#about", "About");
    submenu(
        doc,
        list,
        "Menu",
        &[("#breakfast", "Breakfast"), ("#lunch", "Lunch"), ("#dinner", "Dinner")],
    );
    submenu(doc, list, "Events", &[("#private", "Private dining"), ("#catering", "Catering")]);
    nav_link(doc, list, "#contact", "Contact");

    let item = doc.element(list, "li", &[("class", "overlay__item")]);
    doc.text_element(
        item,
        "a",
        &[("class", "overlay__link js-reserve"), ("href", "#")],
        "Book a table",
    );
}

fn nav_link(doc: &mut Document, list: NodeId, href: &str, label: &str) {
    let item = doc.element(list, "li", &[("class", "overlay__item")]);
    doc.text_element(item, "a", &[("class", "overlay__link"), ("href", href)], label);
}

fn submenu(doc: &mut Document, list: NodeId, label: &str, entries: &[(&str, &str)]) {
    let item = doc.element(list, "li", &[("class", "overlay__item has-sub")]);
    doc.text_element(
        item,
        "button",
        &[("class", "overlay__link"), ("type", "button"), ("aria-expanded", "false")],
        label,
    );
    let panel = doc.element(item, "ul", &[("class", "overlay__sub")]);
    for (href, text) in entries {
        let entry = doc.element(panel, "li", &[("class", "overlay__subitem")]);
        doc.text_element(entry, "a", &[("href", *href)], text);
    }
    if let Some(element) = doc.get_mut(panel) {
        element.natural_height = SUBMENU_ROW_PX * entries.len() as f32;
    }
}

/// Date input plus the time and party-size selects. The dialog variant
/// adds phone and email.
fn reservation_fields(doc: &mut Document, form: NodeId, with_contact: bool) {
    doc.element(form, "input", &[("type", "date"), ("name", "date"), ("class", "field")]);
    if with_contact {
        doc.element(
            form,
            "input",
            &[("type", "tel"), ("name", "phone"), ("class", "field"), ("autocomplete", "tel")],
        );
        doc.element(
            form,
            "input",
            &[("type", "email"), ("name", "email"), ("class", "field"), ("autocomplete", "email")],
        );
    }
    let times: Vec<(&str, &str)> = TIME_SLOTS.iter().map(|t| (*t, *t)).collect();
    custom_select(doc, form, "time", "Select time", &times);
    custom_select(doc, form, "persons", "Select persons", &PARTY_SIZES);
}

fn custom_select(
    doc: &mut Document,
    form: NodeId,
    name: &str,
    placeholder: &str,
    options: &[(&str, &str)],
) {
    doc.element(form, "input", &[("type", "hidden"), ("name", name)]);
    let wrap = doc.element(
        form,
        "div",
        &[("class", "custom-select"), ("data-target", name), ("aria-expanded", "false")],
    );
    let button = doc.element(
        wrap,
        "button",
        &[
            ("class", "custom-select__button"),
            ("type", "button"),
            ("aria-haspopup", "listbox"),
            ("aria-expanded", "false"),
        ],
    );
    doc.text_element(button, "span", &[("class", "custom-select__label")], placeholder);
    let list = doc.element(wrap, "ul", &[("class", "custom-select__list"), ("role", "listbox")]);
    for (value, text) in options {
        doc.text_element(
            list,
            "li",
            &[("class", "custom-select__option"), ("role", "option"), ("data-value", *value)],
            text,
        );
    }
}

fn testimonials(doc: &mut Document, main: NodeId) {
    let section = doc.element(main, "section", &[("class", "testimonials-section")]);
    let wrap = doc.element(
        section,
        "div",
        &[("class", "testimonials"), ("id", "testimonials"), ("tabindex", "0")],
    );
    let card = doc.element(wrap, "blockquote", &[("class", "testimonial")]);
    doc.element(card, "p", &[]);
    let author = doc.element(wrap, "div", &[("class", "author")]);
    doc.element(author, "img", &[("class", "author__avatar"), ("src", ""), ("alt", "")]);
    doc.element(author, "span", &[("class", "author__name")]);
    doc.element(author, "span", &[("class", "author__role")]);

    let controls = doc.element(section, "div", &[("class", "testimonials__controls")]);
    doc.element(
        controls,
        "button",
        &[("class", "testimonials__prev"), ("type", "button"), ("aria-label", "Previous")],
    );
    let counter = doc.element(controls, "div", &[("class", "testimonials__counter")]);
    doc.element(counter, "span", &[("class", "current")]);
    doc.element(counter, "span", &[("class", "total")]);
    doc.element(
        controls,
        "button",
        &[("class", "testimonials__next"), ("type", "button"), ("aria-label", "Next")],
    );
}

fn reservation_modal(doc: &mut Document, body: NodeId) {
    let modal = doc.element(
        body,
        "div",
        &[
            ("class", "modal"),
            ("id", "reserve-modal"),
            ("role", "dialog"),
            ("aria-modal", "true"),
            ("aria-hidden", "true"),
        ],
    );
    let backdrop = doc.element(modal, "div", &[("class", "modal__backdrop")]);
    let dialog = doc.element(backdrop, "div", &[("class", "modal__dialog")]);
    doc.element(
        dialog,
        "button",
        &[("class", "modal__close"), ("type", "button"), ("aria-label", "Close")],
    );
    let form = doc.element(dialog, "form", &[("class", "modal__form")]);
    reservation_fields(doc, form, true);
    doc.text_element(form, "button", &[("class", "btn modal__submit"), ("type", "submit")], "Confirm");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_carries_the_markup_contract() {
        let doc = restaurant_page();
        let root = doc.root();
        for selector in [
            ".nav-toggle",
            "#nav-overlay",
            ".overlay__item.has-sub",
            ".overlay__sub",
            "#reserve-modal",
            ".modal__form",
            "#bottom-bar[data-threshold]",
            ".reservation__form",
            ".custom-select[data-target]",
            "[data-header]",
            "#testimonials",
            ".footer",
        ] {
            assert!(
                doc.query_selector(root, selector).unwrap().is_some(),
                "missing {selector}"
            );
        }
        assert_eq!(doc.query_selector_all(root, ".js-reserve").unwrap().len(), 4);
        assert_eq!(doc.query_selector_all(root, ".custom-select").unwrap().len(), 4);
    }

    #[test]
    fn test_submenu_heights_are_seeded() {
        let doc = restaurant_page();
        let panels = doc.query_selector_all(doc.root(), ".overlay__sub").unwrap();
        let heights: Vec<f32> = panels
            .iter()
            .map(|p| doc.get(*p).unwrap().natural_height)
            .collect();
        assert_eq!(heights, vec![144.0, 96.0]);
    }
}
