#![forbid(unsafe_code)]

//! Test support for dialogkit.
//!
//! - [`CallLog`]: shared recorder that handlers append `"label:role"` to.
//! - [`User`]: drives clicks and key presses through the document, the way a
//!   browser would deliver them.
//! - [`assert_snapshot!`]: compares HTML against `tests/snapshots/<name>.snap`.
//!   Run with `BLESS=1` to create or update snapshots.
//! - [`strategy`]: proptest strategies for roles and dialog specs.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use dialogkit_core::Role;
use dialogkit_core::event::{Event, KeyCode, KeyEvent, Modifiers};
use dialogkit_dom::{DispatchOutcome, Document, DomError, NodeId};
use dialogkit_widgets::modal::{Dialog, HandlerResult};
use tracing::trace;

/// Harness failures.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("dialog has no footer button with role `{0}`")]
    NoButton(String),
    #[error("dialog has been destroyed")]
    NoRoot,
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Ordered record of handler invocations.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that appends `"{label}:{role}"` on each call.
    pub fn recorder(&self, label: &str) -> impl Fn(&Role) -> HandlerResult + 'static {
        let entries = Rc::clone(&self.entries);
        let label = label.to_owned();
        move |role: &Role| {
            entries.borrow_mut().push(format!("{label}:{role}"));
            Ok(())
        }
    }

    /// Append a raw entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    /// Snapshot of all entries in call order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Number of entries recorded under `label`.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        let prefix = format!("{label}:");
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.starts_with(&prefix))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// A handler that always fails with `message`.
pub fn failing(message: &'static str) -> impl Fn(&Role) -> HandlerResult + 'static {
    move |_: &Role| Err(message.into())
}

/// Simulated user input.
#[derive(Debug, Clone)]
pub struct User {
    document: Document,
}

impl User {
    #[must_use]
    pub fn new(document: &Document) -> Self {
        Self {
            document: document.clone(),
        }
    }

    /// Click `node`.
    pub fn click(&self, node: NodeId) -> Result<DispatchOutcome, HarnessError> {
        trace!(node = %node, "user click");
        Ok(self.document.dispatch(node, Event::click())?)
    }

    /// Click the dialog's footer button for `role`.
    pub fn click_role(&self, dialog: &Dialog, role: &str) -> Result<DispatchOutcome, HarnessError> {
        let button = dialog
            .button(role)
            .ok_or_else(|| HarnessError::NoButton(role.to_owned()))?;
        self.click(button)
    }

    /// Press `code` with `node` focused.
    pub fn press(&self, node: NodeId, code: KeyCode) -> Result<DispatchOutcome, HarnessError> {
        self.press_with(node, code, Modifiers::empty())
    }

    /// Press `code` with modifiers held.
    pub fn press_with(
        &self,
        node: NodeId,
        code: KeyCode,
        modifiers: Modifiers,
    ) -> Result<DispatchOutcome, HarnessError> {
        trace!(node = %node, ?code, ?modifiers, "user key press");
        let event = Event::Key(KeyEvent::new(code).with_modifiers(modifiers));
        Ok(self.document.dispatch(node, event)?)
    }

    /// Press Escape inside the dialog.
    ///
    /// The key goes to the focused element when it lies inside the dialog,
    /// otherwise to the dialog root.
    pub fn press_escape(&self, dialog: &Dialog) -> Result<DispatchOutcome, HarnessError> {
        let root = dialog.root().ok_or(HarnessError::NoRoot)?;
        let target = match self.document.active_element() {
            Some(active) if self.document.contains(root, active)? => active,
            _ => root,
        };
        self.press(target, KeyCode::Escape)
    }
}

#[doc(hidden)]
pub fn check_snapshot(manifest_dir: &str, name: &str, actual: &str) {
    let path = Path::new(manifest_dir)
        .join("tests")
        .join("snapshots")
        .join(format!("{name}.snap"));
    if std::env::var_os("BLESS").is_some() {
        let written = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(&path, format!("{actual}\n")));
        if let Err(err) = written {
            panic!("cannot write snapshot {}: {err}", path.display());
        }
        return;
    }
    let expected = match std::fs::read_to_string(&path) {
        Ok(expected) => expected,
        Err(err) => panic!(
            "missing snapshot `{name}` at {} ({err}); run with BLESS=1 to create it",
            path.display()
        ),
    };
    pretty_assertions::assert_eq!(
        expected.trim_end_matches('\n'),
        actual,
        "snapshot `{name}` differs; run with BLESS=1 to update"
    );
}

/// Compare `html` with the stored snapshot `name` of the calling crate.
#[macro_export]
macro_rules! assert_snapshot {
    ($name:expr, $html:expr) => {
        $crate::check_snapshot(env!("CARGO_MANIFEST_DIR"), $name, &$html)
    };
}

/// Proptest strategies.
pub mod strategy {
    use dialogkit_widgets::modal::{ButtonSpec, DialogSpec};
    use proptest::collection::btree_set;
    use proptest::prelude::*;

    /// Short lowercase role names.
    pub fn role() -> impl Strategy<Value = String> {
        "[a-z]{1,8}"
    }

    /// Up to `max` distinct roles.
    pub fn unique_roles(max: usize) -> impl Strategy<Value = Vec<String>> {
        btree_set(role(), 0..=max).prop_map(|roles| roles.into_iter().collect())
    }

    /// Specs with arbitrary text and up to `max_buttons` uniquely-roled buttons.
    pub fn dialog_spec(max_buttons: usize) -> impl Strategy<Value = DialogSpec> {
        let text = "[a-zA-Z0-9 &<>\"']{0,40}";
        (text, text, unique_roles(max_buttons)).prop_map(|(title, message, roles)| {
            roles
                .into_iter()
                .fold(DialogSpec::builder(title, message), |builder, role| {
                    let label = role.to_uppercase();
                    builder.button(ButtonSpec::new(role, label))
                })
                .build()
        })
    }
}
