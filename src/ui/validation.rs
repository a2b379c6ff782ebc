//! Client-side checks for the reservation form.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, NodeId};

static PHONE_NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d+]").unwrap());
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?\d{7,15}$").unwrap());
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").unwrap());

/// Phone numbers: 7 to 15 digits with an optional leading `+`, after
/// stripping everything that is neither a digit nor `+`.
///
/// ```
/// use bistro_ui::ui::validation::is_valid_phone;
///
/// assert!(is_valid_phone("+1 (555) 123-4567"));
/// assert!(!is_valid_phone("12345"));
/// ```
pub fn is_valid_phone(value: &str) -> bool {
    let normalized = PHONE_NOISE.replace_all(value, "");
    PHONE.is_match(&normalized)
}

/// A `local@domain.tld` shape with a top-level domain of two or more
/// characters. Surrounding whitespace is ignored.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

/// Renders a field's validity: `is-invalid`, `aria-invalid`, and a `title`
/// carrying `message` while invalid. Returns `ok`.
pub fn mark_valid(doc: &mut Document, field: NodeId, ok: bool, message: &str) -> bool {
    doc.toggle_class(field, "is-invalid", !ok);
    doc.set_attribute(field, "aria-invalid", if ok { "false" } else { "true" });
    doc.set_attribute(field, "title", if ok { "" } else { message });
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_accepts_formatted_numbers() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(is_valid_phone("0441234567"));
        assert!(is_valid_phone("+380 44 123 45 67"));
    }

    #[test]
    fn test_phone_rejects_wrong_lengths_and_inner_plus() {
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("1234567890123456"));
        assert!(!is_valid_phone("123+4567890"));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("  guest@bistro.example  "));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("@c.de"));
    }

    #[test]
    fn test_mark_valid_renders_both_states() {
        let mut doc = Document::new();
        let body = doc.body();
        let field = doc.element(body, "input", &[("name", "email")]);

        assert!(!mark_valid(&mut doc, field, false, "Please enter a valid email"));
        assert!(doc.has_class(field, "is-invalid"));
        assert_eq!(doc.attribute(field, "aria-invalid"), Some("true"));
        assert_eq!(doc.attribute(field, "title"), Some("Please enter a valid email"));

        assert!(mark_valid(&mut doc, field, true, "Please enter a valid email"));
        assert!(!doc.has_class(field, "is-invalid"));
        assert_eq!(doc.attribute(field, "aria-invalid"), Some("false"));
        assert_eq!(doc.attribute(field, "title"), Some(""));
    }
}
