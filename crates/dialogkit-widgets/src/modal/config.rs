#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Dialog presentation settings.
///
/// Missing fields take their defaults when deserialized, so a page can embed
/// a partial configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Class attribute of the root element. May hold several classes.
    pub root_class: String,
    /// Class toggled by show and dismiss. Must be a single class name.
    pub active_class: String,
    /// Accessible label of the header close control.
    pub close_label: String,
    /// Focus a footer button on show (the `"cancel"` button, else the first).
    pub focus_default: bool,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            root_class: "modal".into(),
            active_class: "is-active".into(),
            close_label: "Stäng".into(),
            focus_default: true,
        }
    }
}

impl DialogConfig {
    /// Set the root element's class attribute.
    #[must_use]
    pub fn root_class(mut self, class: impl Into<String>) -> Self {
        self.root_class = class.into();
        self
    }

    /// Set the class that marks the dialog visible.
    #[must_use]
    pub fn active_class(mut self, class: impl Into<String>) -> Self {
        self.active_class = class.into();
        self
    }

    /// Set the close control's accessible label.
    #[must_use]
    pub fn close_label(mut self, label: impl Into<String>) -> Self {
        self.close_label = label.into();
        self
    }

    /// Enable or disable focusing a footer button on show.
    #[must_use]
    pub fn focus_default(mut self, enabled: bool) -> Self {
        self.focus_default = enabled;
        self
    }
}
