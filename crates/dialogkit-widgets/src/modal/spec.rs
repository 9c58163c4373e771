#![forbid(unsafe_code)]

//! Declarative dialog descriptions and presets.
//!
//! ```
//! use dialogkit_widgets::modal::{ButtonSpec, DialogSpec};
//!
//! let alert = DialogSpec::alert("Saved", "Your post was published.");
//! let confirm = DialogSpec::confirm("Delete?", "This cannot be undone.");
//! let custom = DialogSpec::builder("Report", "Why are you reporting this post?")
//!     .button(ButtonSpec::new("spam", "Spam"))
//!     .button(ButtonSpec::new("abuse", "Abuse").style("is-danger"))
//!     .cancel_button()
//!     .build();
//! assert_eq!(custom.buttons.len(), 3);
//! ```

use std::fmt;
use std::rc::Rc;

use dialogkit_core::Role;
use serde::{Deserialize, Serialize};

use super::handlers::{Handler, HandlerResult};

/// Label of the preset `ok` button.
pub const OK_LABEL: &str = "Stäng";
/// Label of the preset `confirm` button.
pub const CONFIRM_LABEL: &str = "Bekräfta";
/// Label of the preset `cancel` button.
pub const CANCEL_LABEL: &str = "Avbryt";

/// A footer button.
#[derive(Clone, Serialize, Deserialize)]
pub struct ButtonSpec {
    /// Identity used for dispatch and the `data-role` attribute.
    pub role: Role,
    /// Visible label.
    pub title: String,
    /// Extra classes appended after `button`.
    #[serde(default, alias = "class", skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Handler registered under `role` when the dialog is created.
    #[serde(skip)]
    pub handler: Option<Handler>,
}

impl ButtonSpec {
    /// Create a button with no style and no handler.
    pub fn new(role: impl Into<Role>, title: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            title: title.into(),
            style: None,
            handler: None,
        }
    }

    /// Set extra classes (e.g. `is-danger`).
    #[must_use]
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Attach a handler for this button's role.
    #[must_use]
    pub fn on_click<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Role) -> HandlerResult + 'static,
    {
        self.handler = Some(Rc::new(callback));
        self
    }

    /// Attach a shared handler for this button's role.
    #[must_use]
    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }
}

impl fmt::Debug for ButtonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonSpec")
            .field("role", &self.role)
            .field("title", &self.title)
            .field("style", &self.style)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Title, message, and ordered footer buttons of a dialog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogSpec {
    pub title: String,
    pub message: String,
    /// Footer buttons in display order. May be empty; the header close
    /// control is always rendered.
    #[serde(default)]
    pub buttons: Vec<ButtonSpec>,
}

impl DialogSpec {
    /// A dialog with no footer buttons.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            buttons: Vec::new(),
        }
    }

    /// Message with a single `ok` button.
    pub fn alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::builder(title, message).ok_button().build()
    }

    /// Message with `confirm` and `cancel` buttons.
    pub fn confirm(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::builder(title, message)
            .button(ButtonSpec::new("confirm", CONFIRM_LABEL).style("is-primary"))
            .cancel_button()
            .build()
    }

    /// Start a custom dialog.
    pub fn builder(title: impl Into<String>, message: impl Into<String>) -> DialogSpecBuilder {
        DialogSpecBuilder {
            spec: Self::new(title, message),
        }
    }

    /// Parse a dialog description embedded in a page.
    ///
    /// Handlers cannot be expressed in JSON; register them with
    /// [`Dialog::on`](super::Dialog::on).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Roles of the footer buttons in display order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.buttons.iter().map(|button| &button.role)
    }
}

/// Builder returned by [`DialogSpec::builder`].
#[derive(Debug, Clone)]
pub struct DialogSpecBuilder {
    spec: DialogSpec,
}

impl DialogSpecBuilder {
    /// Add a button.
    #[must_use]
    pub fn button(mut self, button: ButtonSpec) -> Self {
        self.spec.buttons.push(button);
        self
    }

    /// Add an `ok` button.
    #[must_use]
    pub fn ok_button(self) -> Self {
        self.button(ButtonSpec::new("ok", OK_LABEL).style("is-primary"))
    }

    /// Add a `cancel` button.
    #[must_use]
    pub fn cancel_button(self) -> Self {
        self.button(ButtonSpec::new(Role::CANCEL, CANCEL_LABEL))
    }

    /// Build the spec. An empty button list stays empty.
    #[must_use]
    pub fn build(self) -> DialogSpec {
        self.spec
    }
}
