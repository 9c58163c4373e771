#![forbid(unsafe_code)]

//! Input events delivered to dialog listeners.
//!
//! The shapes follow the DOM events a dialog subscribes to: `click` on its
//! buttons and `keydown` on its root. Key codes are parsed from the DOM
//! `KeyboardEvent.code` strings so a browser host can forward them as-is.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held while an event fired.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL = 0b0010;
        const ALT = 0b0100;
        const META = 0b1000;
    }
}

/// Physical key, as reported by `KeyboardEvent.code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Space,
    Backspace,
    /// Letter or digit key, lowercased.
    Char(char),
    /// Any other code, kept verbatim.
    Other(String),
}

impl KeyCode {
    /// Parse a DOM `KeyboardEvent.code` value.
    ///
    /// `"KeyA"` and `"Digit1"` map to [`KeyCode::Char`]; unknown codes are
    /// preserved in [`KeyCode::Other`].
    #[must_use]
    pub fn from_dom_code(code: &str) -> Self {
        match code {
            "Escape" => Self::Escape,
            "Enter" | "NumpadEnter" => Self::Enter,
            "Tab" => Self::Tab,
            "Space" => Self::Space,
            "Backspace" => Self::Backspace,
            _ => {
                let single = code
                    .strip_prefix("Key")
                    .or_else(|| code.strip_prefix("Digit"))
                    .and_then(|rest| {
                        let mut chars = rest.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) if c.is_ascii_alphanumeric() => {
                                Some(c.to_ascii_lowercase())
                            }
                            _ => None,
                        }
                    });
                match single {
                    Some(c) => Self::Char(c),
                    None => Self::Other(code.to_owned()),
                }
            }
        }
    }
}

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Release,
}

/// A keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// Set the held modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event kind.
    #[must_use]
    pub fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Mouse button that produced a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

/// A click (pointer activation) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClickEvent {
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl ClickEvent {
    /// A plain left click.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Event type a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    KeyUp,
}

/// An input event dispatched through the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Event {
    Click(ClickEvent),
    Key(KeyEvent),
}

impl Event {
    /// A plain left click.
    #[must_use]
    pub fn click() -> Self {
        Self::Click(ClickEvent::new())
    }

    /// A key press with no modifiers.
    #[must_use]
    pub fn key_down(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code))
    }

    /// The listener type this event is delivered to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Click(_) => EventKind::Click,
            Self::Key(KeyEvent {
                kind: KeyEventKind::Press,
                ..
            }) => EventKind::KeyDown,
            Self::Key(KeyEvent {
                kind: KeyEventKind::Release,
                ..
            }) => EventKind::KeyUp,
        }
    }

    /// Whether this is a key press of `code`.
    #[must_use]
    pub fn is_key_down(&self, code: &KeyCode) -> bool {
        matches!(
            self,
            Self::Key(KeyEvent {
                code: pressed,
                kind: KeyEventKind::Press,
                ..
            }) if pressed == code
        )
    }

    /// Modifiers held while the event fired.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::Click(click) => click.modifiers,
            Self::Key(key) => key.modifiers,
        }
    }
}
