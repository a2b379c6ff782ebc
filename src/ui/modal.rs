//! Reservation dialog: open/close, prefill, validation and confirmation.

use anyhow::Result;
use serde::Serialize;

use super::custom_select::set_value;
use super::focus::{focus_first, trap_tab};
use super::toast::Toast;
use super::validation::{is_valid_email, is_valid_phone, mark_valid};
use super::{Context, LayerKind};
use crate::dom::{Document, Key, KeyEvent, NodeId, ScrollBlock};

/// Visibility of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalState {
    /// `aria-hidden="true"`
    Hidden,
    /// Shown and trapping focus
    Visible,
}

/// A field of the reservation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationField {
    /// Visit date
    Date,
    /// Contact phone
    Phone,
    /// Contact email
    Email,
    /// Time slot (custom select)
    Time,
    /// Party size (custom select)
    Persons,
}

impl ReservationField {
    /// All fields in validation order.
    pub const ALL: [Self; 5] = [
        Self::Date,
        Self::Phone,
        Self::Email,
        Self::Time,
        Self::Persons,
    ];

    /// The `name` attribute of the field's input.
    pub fn name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Time => "time",
            Self::Persons => "persons",
        }
    }

    fn input_selector(self) -> &'static str {
        match self {
            Self::Date => "input[name=\"date\"]",
            Self::Phone => "input[name=\"phone\"]",
            Self::Email => "input[name=\"email\"]",
            Self::Time => "input[name=\"time\"]",
            Self::Persons => "input[name=\"persons\"]",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::Date => "Please enter a date",
            Self::Phone => "Please enter a valid phone number",
            Self::Email => "Please enter a valid email",
            Self::Time => "Please select a time",
            Self::Persons => "Please select the number of persons",
        }
    }

    fn is_select(self) -> bool {
        matches!(self, Self::Time | Self::Persons)
    }

    fn accepts(self, value: &str) -> bool {
        match self {
            Self::Date => !value.trim().is_empty(),
            Self::Phone => is_valid_phone(value),
            Self::Email => is_valid_email(value),
            Self::Time | Self::Persons => !value.is_empty(),
        }
    }
}

/// Result of a submit on the dialog form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Some fields failed; the dialog stays open
    Invalid(Vec<ReservationField>),
    /// Values copied back, dialog closed, confirmation shown
    Submitted,
}

/// The `#reserve-modal` dialog.
#[derive(Debug, Clone)]
pub struct ReservationModal {
    root: NodeId,
    form: Option<NodeId>,
    close_button: Option<NodeId>,
    backdrop: Option<NodeId>,
    section_form: Option<NodeId>,
    state: ModalState,
    last_focused: Option<NodeId>,
    last_trigger: Option<NodeId>,
    last_scroll_y: f64,
    toast: Toast,
}

impl ReservationModal {
    /// Finds `#reserve-modal` and renders it hidden.
    pub fn discover(doc: &mut Document) -> Result<Option<Self>> {
        let Some(root) = doc.get_element_by_id("reserve-modal") else {
            tracing::debug!("reservation modal markup not found");
            return Ok(None);
        };
        let modal = Self {
            root,
            form: doc.query_selector(root, ".modal__form")?,
            close_button: doc.query_selector(root, ".modal__close")?,
            backdrop: doc.query_selector(root, ".modal__backdrop")?,
            section_form: doc.query_selector(doc.root(), ".reservation__form")?,
            state: ModalState::Hidden,
            last_focused: None,
            last_trigger: None,
            last_scroll_y: 0.0,
            toast: Toast::new(),
        };
        modal.render(doc);
        Ok(Some(modal))
    }

    /// The dialog root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `.modal__form` element.
    pub fn form(&self) -> Option<NodeId> {
        self.form
    }

    /// Current state.
    pub fn state(&self) -> ModalState {
        self.state
    }

    /// Whether the dialog is shown.
    pub fn is_visible(&self) -> bool {
        self.state == ModalState::Visible
    }

    /// Element focused when the dialog last opened.
    pub fn last_focused(&self) -> Option<NodeId> {
        self.last_focused
    }

    /// The confirmation notice.
    pub fn toast(&self) -> &Toast {
        &self.toast
    }

    /// Shows the dialog and prefills it from the inline form. No-op when
    /// already visible.
    pub fn open(&mut self, cx: &mut Context<'_>) -> Result<()> {
        if self.is_visible() {
            return Ok(());
        }
        self.last_focused = Some(cx.doc.active_element());
        self.state = ModalState::Visible;
        cx.layers.set_open(LayerKind::Modal, true);
        self.render(cx.doc);

        if !focus_first(cx.doc, self.root) {
            cx.doc.focus(self.close_button.unwrap_or(self.root));
        }
        self.prefill(cx)?;
        tracing::debug!("modal opened");
        Ok(())
    }

    /// Hides the dialog and restores focus. No-op when already hidden.
    pub fn close(&mut self, cx: &mut Context<'_>) {
        if !self.is_visible() {
            return;
        }
        self.state = ModalState::Hidden;
        cx.layers.set_open(LayerKind::Modal, false);
        self.render(cx.doc);
        match self.last_focused.take().filter(|n| cx.doc.is_connected(*n)) {
            Some(target) => {
                cx.doc.focus(target);
            }
            None => cx.doc.blur(),
        }
        tracing::debug!("modal closed");
    }

    /// Takes over a focus target from a layer that closed underneath the
    /// dialog, when the recorded one belongs to that layer.
    pub fn adopt_restore_target(&mut self, doc: &Document, closed_layer: NodeId, target: NodeId) {
        let stale = self
            .last_focused
            .is_none_or(|node| doc.contains(closed_layer, node));
        if stale {
            self.last_focused = Some(target);
        }
    }

    /// Copies date, time and party size from the inline form.
    pub fn prefill(&mut self, cx: &mut Context<'_>) -> Result<()> {
        let Some(form) = self.form else {
            return Ok(());
        };
        let values = self.section_values(cx.doc)?;
        let [date, time, persons] = values;
        if !date.is_empty() {
            if let Some(input) = cx.doc.query_selector(form, ReservationField::Date.input_selector())? {
                cx.doc.set_value(input, &date);
            }
        }
        let modal = &cx.config.modal;
        set_value(cx.doc, form, "time", &time, Some(&modal.time_placeholder))?;
        set_value(cx.doc, form, "persons", &persons, Some(&modal.persons_placeholder))?;
        Ok(())
    }

    /// Click routing: `.js-reserve` triggers, the close control and the
    /// backdrop. Returns `true` when the default action is prevented.
    pub fn handle_click(&mut self, cx: &mut Context<'_>, target: NodeId) -> Result<bool> {
        if let Some(trigger) = cx.doc.closest(target, ".js-reserve")? {
            self.last_trigger = Some(trigger);
            self.last_scroll_y = cx.doc.viewport.scroll_y;
            self.open(cx)?;
            return Ok(false);
        }
        if !cx.doc.contains(self.root, target) {
            return Ok(false);
        }
        let on_close = self
            .close_button
            .is_some_and(|button| cx.doc.contains(button, target));
        let on_backdrop = self.backdrop.is_some_and(|backdrop| {
            cx.doc.contains(backdrop, target)
                && (target == backdrop || cx.doc.has_attribute(target, "data-close"))
        });
        if on_close || on_backdrop {
            self.close(cx);
        }
        Ok(false)
    }

    /// Keyboard handling while visible. Returns `true` when consumed.
    pub fn handle_key(&mut self, cx: &mut Context<'_>, event: &KeyEvent) -> Result<bool> {
        if !self.is_visible() {
            return Ok(false);
        }
        if event.key == Key::Escape {
            self.close(cx);
            return Ok(true);
        }
        Ok(trap_tab(cx.doc, self.root, event))
    }

    /// Validates and submits the dialog form. Returns `None` when `form` is
    /// not the dialog form.
    pub fn submit(&mut self, cx: &mut Context<'_>, form: NodeId) -> Result<Option<SubmitOutcome>> {
        if self.form != Some(form) {
            return Ok(None);
        }
        let invalid = self.validate(cx.doc, form)?;
        if !invalid.is_empty() {
            tracing::debug!("reservation rejected: {invalid:?}");
            return Ok(Some(SubmitOutcome::Invalid(invalid)));
        }

        let date = field_value(cx.doc, form, ReservationField::Date)?;
        let time = field_value(cx.doc, form, ReservationField::Time)?;
        let persons = field_value(cx.doc, form, ReservationField::Persons)?;
        if let Some(section) = self.section_form {
            for (field, value) in [
                (ReservationField::Date, &date),
                (ReservationField::Time, &time),
                (ReservationField::Persons, &persons),
            ] {
                if let Some(input) = cx.doc.query_selector(section, field.input_selector())? {
                    cx.doc.set_value(input, value);
                }
            }
            set_value(cx.doc, section, "time", &time, None)?;
            set_value(cx.doc, section, "persons", &persons, None)?;
        }

        self.close(cx);
        match self.last_trigger.filter(|n| cx.doc.is_connected(*n)) {
            Some(trigger) => cx.doc.scroll_into_view(trigger, ScrollBlock::Center, true),
            None => cx.doc.scroll_to(self.last_scroll_y, true),
        }
        let config = cx.config;
        self.toast.show(cx, &config.modal.confirmation_message);
        tracing::info!("reservation submitted for {date} {time}, {persons} persons");
        Ok(Some(SubmitOutcome::Submitted))
    }

    /// Timer callback for the confirmation notice.
    pub fn dismiss_toast(&mut self, doc: &mut Document) {
        self.toast.dismiss(doc);
    }

    /// Fields currently rendered invalid.
    pub fn invalid_fields(&self, doc: &Document) -> Result<Vec<ReservationField>> {
        let Some(form) = self.form else {
            return Ok(Vec::new());
        };
        let mut invalid = Vec::new();
        for field in ReservationField::ALL {
            if let Some(marker) = marker_node(doc, form, field)? {
                if doc.has_class(marker, "is-invalid") {
                    invalid.push(field);
                }
            }
        }
        Ok(invalid)
    }

    fn validate(&self, doc: &mut Document, form: NodeId) -> Result<Vec<ReservationField>> {
        let mut invalid = Vec::new();
        for field in ReservationField::ALL {
            let Some(input) = doc.query_selector(form, field.input_selector())? else {
                continue;
            };
            let ok = field.accepts(doc.value(input));
            if let Some(marker) = marker_node(doc, form, field)? {
                mark_valid(doc, marker, ok, field.message());
            }
            if !ok {
                invalid.push(field);
            }
        }
        Ok(invalid)
    }

    fn section_values(&self, doc: &Document) -> Result<[String; 3]> {
        let Some(section) = self.section_form else {
            return Ok(Default::default());
        };
        Ok([
            field_value(doc, section, ReservationField::Date)?,
            field_value(doc, section, ReservationField::Time)?,
            field_value(doc, section, ReservationField::Persons)?,
        ])
    }

    fn render(&self, doc: &mut Document) {
        let visible = self.is_visible();
        doc.set_attribute(self.root, "aria-hidden", if visible { "false" } else { "true" });
        let body = doc.body();
        doc.toggle_class(body, "modal-open", visible);
    }
}

fn field_value(doc: &Document, scope: NodeId, field: ReservationField) -> Result<String> {
    Ok(doc
        .query_selector(scope, field.input_selector())?
        .map(|input| doc.value(input).to_string())
        .unwrap_or_default())
}

/// Element carrying a field's validity: the input itself, or the custom
/// select wrap for select-backed fields.
fn marker_node(doc: &Document, form: NodeId, field: ReservationField) -> Result<Option<NodeId>> {
    if field.is_select() {
        return Ok(doc
            .query_selector_all(form, ".custom-select[data-target]")?
            .into_iter()
            .find(|wrap| doc.attribute(*wrap, "data-target") == Some(field.name())));
    }
    doc.query_selector(form, field.input_selector())
}
