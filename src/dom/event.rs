//! Keyboard input as the page sees it.

use std::fmt;

/// The `key` of a keyboard event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// `Tab`
    Tab,
    /// `Escape`
    Escape,
    /// `Enter`
    Enter,
    /// `" "`
    Space,
    /// `ArrowUp`
    ArrowUp,
    /// `ArrowDown`
    ArrowDown,
    /// `ArrowLeft`
    ArrowLeft,
    /// `ArrowRight`
    ArrowRight,
    /// `Home`
    Home,
    /// `End`
    End,
    /// Any other key, kept verbatim
    Other(String),
}

impl Key {
    /// Parses a DOM `KeyboardEvent.key` value. `"Esc"` and `"Spacebar"` are
    /// accepted for older engines.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            " " | "Spacebar" | "Space" => Self::Space,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Home" => Self::Home,
            "End" => Self::End,
            other => Self::Other(other.to_string()),
        }
    }

    /// The DOM `key` string.
    pub fn as_dom(&self) -> &str {
        match self {
            Self::Tab => "Tab",
            Self::Escape => "Escape",
            Self::Enter => "Enter",
            Self::Space => " ",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::Home => "Home",
            Self::End => "End",
            Self::Other(other) => other,
        }
    }

    /// Whether this key activates a focused control.
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Enter | Self::Space)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space => f.write_str("Space"),
            other => f.write_str(other.as_dom()),
        }
    }
}

/// A `keydown` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Pressed key
    pub key: Key,
    /// Shift modifier held
    pub shift: bool,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    /// A key press with Shift held.
    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}
