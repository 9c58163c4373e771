#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use dialogkit_core::Role;
use dialogkit_core::event::{EventKind, KeyCode};
use dialogkit_dom::{Document, DomError, NodeId, WeakDocument};
use tracing::{debug, trace, warn};

use super::config::DialogConfig;
use super::handlers::{HandlerError, HandlerResult};
use super::lifecycle::{DialogMachine, Lifecycle};
use super::spec::DialogSpec;
use super::template::{self, ROLE_ATTR};

/// Dialog failures.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    /// A document operation failed.
    #[error("document error: {0}")]
    Dom(#[from] DomError),
    /// A registered handler returned an error.
    #[error("handler for role `{role}` failed: {source}")]
    Handler { role: Role, source: HandlerError },
    /// The dialog was destroyed and cannot be shown again.
    #[error("dialog has been destroyed")]
    Destroyed,
    /// Every handle to the dialog's document has been dropped.
    #[error("dialog document has been dropped")]
    Detached,
}

impl From<DialogError> for HandlerError {
    fn from(err: DialogError) -> Self {
        HandlerError::new(err)
    }
}

struct DialogInner {
    /// Weak: the document's listeners own clones of this dialog.
    document: WeakDocument,
    /// `None` once destroyed.
    root: Option<NodeId>,
    /// Footer buttons in document order.
    buttons: Vec<(Role, NodeId)>,
    machine: DialogMachine,
    config: DialogConfig,
}

/// A modal dialog bound to a [`Document`].
///
/// `Dialog` is a cheap handle; clones share state. Click and Escape
/// listeners hold a clone, so the dialog keeps working while its document
/// lives, even with no handle left. The dialog only refers back to the
/// document weakly: dropping every document handle frees the tree, its
/// listeners, and the dialog. [`destroy`](Self::destroy) releases the
/// subtree and its listeners early.
#[derive(Clone)]
pub struct Dialog {
    inner: Rc<RefCell<DialogInner>>,
}

impl Dialog {
    /// Build a dialog with the default configuration.
    ///
    /// The subtree is created detached; call [`show`](Self::show) to insert it.
    pub fn create(document: &Document, spec: DialogSpec) -> Result<Self, DialogError> {
        Self::create_with_config(document, spec, DialogConfig::default())
    }

    /// Build a dialog with `config`.
    pub fn create_with_config(
        document: &Document,
        spec: DialogSpec,
        config: DialogConfig,
    ) -> Result<Self, DialogError> {
        dialogkit_dom::validate_name(&config.active_class)?;
        let root = document.create_element("div");
        document.set_attribute(root, "class", config.root_class.clone())?;
        document.set_attribute(root, "tabindex", "0")?;
        document.append_markup(root, &template::render(&spec, &config))?;

        let mut controls = Vec::new();
        for control in document.find_all(root, |el| {
            el.tag() == "button" && el.attr(ROLE_ATTR).is_some()
        })? {
            let role = document.attribute(control, ROLE_ATTR)?.unwrap_or_default();
            controls.push((Role::from(role), control));
        }

        let mut buttons = Vec::new();
        if let Some(footer) = document.find(root, |el| el.tag() == "footer")? {
            for (role, control) in &controls {
                if document.contains(footer, *control)? {
                    buttons.push((role.clone(), *control));
                }
            }
        }

        let mut machine = DialogMachine::new();
        for button in &spec.buttons {
            if let Some(handler) = &button.handler {
                machine.on(button.role.clone(), Rc::clone(handler));
            }
        }

        let dialog = Self {
            inner: Rc::new(RefCell::new(DialogInner {
                document: document.downgrade(),
                root: Some(root),
                buttons,
                machine,
                config,
            })),
        };

        for (role, control) in controls {
            let target = dialog.clone();
            document.add_listener(control, EventKind::Click, move |_| {
                target.dismiss(role.clone())?;
                Ok(())
            })?;
        }

        let target = dialog.clone();
        document.add_listener(root, EventKind::KeyDown, move |ctx| {
            if ctx.event().is_key_down(&KeyCode::Escape) {
                ctx.prevent_default();
                target.dismiss(Role::cancel())?;
            }
            Ok(())
        })?;

        debug!(root = %root, buttons = spec.buttons.len(), "dialog created");
        Ok(dialog)
    }

    /// Register `callback` for `role`, replacing any earlier handler.
    ///
    /// The `"destroy"` role registers the teardown handler.
    pub fn on<F>(&self, role: impl Into<Role>, callback: F) -> &Self
    where
        F: Fn(&Role) -> HandlerResult + 'static,
    {
        self.inner.borrow_mut().machine.on(role, Rc::new(callback));
        self
    }

    /// Register a handler that runs after the role handler on every dismissal.
    pub fn always<F>(&self, callback: F) -> &Self
    where
        F: Fn(&Role) -> HandlerResult + 'static,
    {
        self.inner.borrow_mut().machine.always(Rc::new(callback));
        self
    }

    /// Activate the dialog, insert it into the body if detached, and focus
    /// the default footer button.
    pub fn show(&self) -> Result<&Self, DialogError> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        if inner.machine.is_destroyed() {
            return Err(DialogError::Destroyed);
        }
        let root = inner.root.ok_or(DialogError::Destroyed)?;
        let document = inner.document.upgrade().ok_or(DialogError::Detached)?;

        document.add_class(root, &inner.config.active_class)?;
        if document.parent(root)?.is_none() {
            document.append_child(document.body(), root)?;
        }

        if inner.config.focus_default {
            let focus = inner
                .buttons
                .iter()
                .find(|(role, _)| role.is_cancel())
                .or_else(|| inner.buttons.first());
            if let Some((_, button)) = focus {
                document.focus(*button)?;
            }
        }

        // The document shows the dialog; only now is it active.
        if inner.machine.show()? {
            debug!(root = %root, "dialog shown");
        } else {
            trace!(root = %root, "dialog already shown");
        }
        Ok(self)
    }

    /// Hide the dialog and run the handlers for `role`.
    ///
    /// Does nothing unless the dialog is active. The role handler runs first,
    /// then the always-handler; an error from either is returned and the
    /// remaining handler is skipped. The subtree stays in the document.
    pub fn dismiss(&self, role: impl Into<Role>) -> Result<&Self, DialogError> {
        let dismissal = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            // Hide first; a failure leaves the dialog active and shown.
            if inner.machine.is_active()
                && let Some(root) = inner.root
            {
                let document = inner.document.upgrade().ok_or(DialogError::Detached)?;
                document.remove_class(root, &inner.config.active_class)?;
            }
            let Some(dismissal) = inner.machine.dismiss(role.into()) else {
                return Ok(self);
            };
            dismissal
        };

        debug!(role = %dismissal.role(), "dialog dismissed");
        dismissal
            .run()
            .inspect_err(|err| warn!(error = %err, "dialog handler failed"))?;
        Ok(self)
    }

    /// Tear the dialog down.
    ///
    /// Runs the `"destroy"` handler exactly once, whatever the state, then
    /// releases the subtree and its listeners. Later calls do nothing. A
    /// handler error is returned after the subtree is gone.
    pub fn destroy(&self) -> Result<(), DialogError> {
        let (teardown, document, root) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let Some(teardown) = inner.machine.destroy() else {
                trace!("dialog already destroyed");
                return Ok(());
            };
            inner.buttons.clear();
            (teardown, inner.document.upgrade(), inner.root.take())
        };

        let outcome = teardown.run();
        if let (Some(document), Some(root)) = (document, root) {
            document.release(root)?;
        }
        debug!(root = ?root, "dialog destroyed");
        outcome.inspect_err(|err| warn!(error = %err, "dialog destroy handler failed"))
    }

    /// The footer button rendered for `role`, first in document order.
    ///
    /// The header close control is not a footer button.
    #[must_use]
    pub fn button(&self, role: &str) -> Option<NodeId> {
        self.inner
            .borrow()
            .buttons
            .iter()
            .find(|(candidate, _)| candidate.as_str() == role)
            .map(|(_, id)| *id)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.borrow().machine.is_active()
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().machine.is_destroyed()
    }

    #[must_use]
    pub fn state(&self) -> Lifecycle {
        self.inner.borrow().machine.state()
    }

    /// Root element; `None` after [`destroy`](Self::destroy).
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.inner.borrow().root
    }

    /// The document this dialog renders into, while it is alive.
    #[must_use]
    pub fn document(&self) -> Option<Document> {
        self.inner.borrow().document.upgrade()
    }

    /// Whether both handles refer to the same dialog.
    #[must_use]
    pub fn ptr_eq(&self, other: &Dialog) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Dialog")
            .field("root", &inner.root)
            .field("state", &inner.machine.state())
            .field("handlers", inner.machine.handlers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::spec::ButtonSpec;
    use dialogkit_core::event::Event;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use tracing_test::traced_test;

    fn yes_no() -> DialogSpec {
        DialogSpec::builder("Confirm", "Delete this?")
            .button(ButtonSpec::new("yes", "Delete"))
            .button(ButtonSpec::new("no", "Cancel"))
            .build()
    }

    #[test]
    fn create_builds_detached_root() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, yes_no()).unwrap();
        let root = dialog.root().unwrap();
        assert_eq!(doc.tag_name(root).unwrap(), "div");
        assert_eq!(doc.attribute(root, "class").unwrap().as_deref(), Some("modal"));
        assert_eq!(doc.attribute(root, "tabindex").unwrap().as_deref(), Some("0"));
        assert_eq!(doc.parent(root).unwrap(), None);
        assert!(!dialog.is_active());
    }

    #[test]
    fn button_finds_footer_buttons_only() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, yes_no()).unwrap();
        let yes = dialog.button("yes").unwrap();
        assert_eq!(doc.text_content(yes).unwrap(), "Delete");
        assert!(dialog.button("no").is_some());
        // The header close control carries "cancel" but is not a footer button.
        assert_eq!(dialog.button("cancel"), None);
    }

    #[test]
    fn show_focuses_cancel_then_first_button() {
        let doc = Document::new();
        let confirm = Dialog::create(&doc, DialogSpec::confirm("t", "m")).unwrap();
        confirm.show().unwrap();
        assert_eq!(doc.active_element(), confirm.button("cancel"));

        let custom = Dialog::create(&doc, yes_no()).unwrap();
        custom.show().unwrap();
        assert_eq!(doc.active_element(), custom.button("yes"));
    }

    #[test]
    fn show_without_buttons_leaves_focus_alone() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, DialogSpec::new("t", "m")).unwrap();
        dialog.show().unwrap();
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn focus_default_can_be_disabled() {
        let doc = Document::new();
        let config = DialogConfig::default().focus_default(false);
        let dialog = Dialog::create_with_config(&doc, yes_no(), config).unwrap();
        dialog.show().unwrap();
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn custom_classes_are_used() {
        let doc = Document::new();
        let config = DialogConfig::default()
            .root_class("modal is-small")
            .active_class("open");
        let dialog = Dialog::create_with_config(&doc, yes_no(), config).unwrap();
        let root = dialog.root().unwrap();
        dialog.show().unwrap();
        assert!(doc.has_class(root, "is-small").unwrap());
        assert!(doc.has_class(root, "open").unwrap());
        assert!(!doc.has_class(root, "is-active").unwrap());
        dialog.dismiss("no").unwrap();
        assert!(!doc.has_class(root, "open").unwrap());
    }

    #[test]
    fn spec_handlers_are_registered() {
        let doc = Document::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let spec = DialogSpec::builder("t", "m")
            .button(ButtonSpec::new("yes", "Yes").on_click(move |_| {
                counter.set(counter.get() + 1);
                Ok(())
            }))
            .build();
        let dialog = Dialog::create(&doc, spec).unwrap();
        dialog.show().unwrap();
        doc.dispatch(dialog.button("yes").unwrap(), Event::click())
            .unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn on_overrides_spec_handler() {
        let doc = Document::new();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let spec_log = Rc::clone(&hits);
        let spec = DialogSpec::builder("t", "m")
            .button(ButtonSpec::new("yes", "Yes").on_click(move |_| {
                spec_log.borrow_mut().push("spec");
                Ok(())
            }))
            .build();
        let dialog = Dialog::create(&doc, spec).unwrap();
        let on_log = Rc::clone(&hits);
        dialog.on("yes", move |_| {
            on_log.borrow_mut().push("on");
            Ok(())
        });
        dialog.show().unwrap().dismiss("yes").unwrap();
        assert_eq!(*hits.borrow(), vec!["on"]);
    }

    #[test]
    fn always_handler_may_destroy_the_dialog() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, yes_no()).unwrap();
        let handle = dialog.clone();
        dialog.always(move |_| Ok(handle.destroy()?));
        dialog.show().unwrap();

        let root = dialog.root().unwrap();
        let outcome = doc.dispatch(dialog.button("yes").unwrap(), Event::click()).unwrap();
        assert!(outcome.is_ok());
        assert!(dialog.is_destroyed());
        assert!(!doc.is_connected(root));
        assert!(doc.children(doc.body()).unwrap().is_empty());
    }

    #[test]
    fn destroy_releases_listeners() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, yes_no()).unwrap();
        let root = dialog.root().unwrap();
        assert_eq!(doc.listener_count(root), 1);
        dialog.destroy().unwrap();
        assert_eq!(doc.listener_count(root), 0);
        assert_eq!(dialog.root(), None);
        assert_eq!(dialog.button("yes"), None);
    }

    #[test]
    fn show_after_destroy_is_an_error() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, yes_no()).unwrap();
        dialog.destroy().unwrap();
        assert!(matches!(dialog.show(), Err(DialogError::Destroyed)));
        // Dismiss on a destroyed dialog stays a silent no-op.
        assert!(dialog.dismiss("yes").is_ok());
    }

    #[test]
    fn click_handler_error_surfaces_in_dispatch() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, yes_no()).unwrap();
        dialog.on("yes", |_| Err("server refused".into()));
        dialog.show().unwrap();

        let outcome = doc.dispatch(dialog.button("yes").unwrap(), Event::click()).unwrap();
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(
            outcome.failures[0].to_string(),
            "handler for role `yes` failed: server refused"
        );
        assert!(!dialog.is_active());
    }

    #[test]
    fn dialogs_share_nothing_but_the_document() {
        let doc = Document::new();
        let first = Dialog::create(&doc, yes_no()).unwrap();
        let second = Dialog::create(&doc, yes_no()).unwrap();
        first.show().unwrap();
        second.show().unwrap();
        first.dismiss("no").unwrap();
        assert!(!first.is_active());
        assert!(second.is_active());
        assert!(!first.ptr_eq(&second));
        assert_eq!(doc.children(doc.body()).unwrap().len(), 2);
    }

    #[test]
    fn whitespace_active_class_is_rejected_at_create() {
        let doc = Document::new();
        let config: DialogConfig =
            serde_json::from_str(r#"{"active_class":"is-active is-clipped"}"#).unwrap();
        let err = Dialog::create_with_config(&doc, yes_no(), config).unwrap_err();
        assert!(matches!(
            err,
            DialogError::Dom(DomError::InvalidName(name)) if name == "is-active is-clipped"
        ));
        assert!(doc.children(doc.body()).unwrap().is_empty());
    }

    #[test]
    fn failed_show_leaves_dialog_inactive() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, yes_no()).unwrap();
        let root = dialog.root().unwrap();
        doc.release(root).unwrap();

        assert!(matches!(dialog.show(), Err(DialogError::Dom(DomError::UnknownNode(_)))));
        assert!(!dialog.is_active());
        assert!(doc.children(doc.body()).unwrap().is_empty());
    }

    #[test]
    fn failed_hide_keeps_dialog_active_and_handlers_unrun() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, yes_no()).unwrap();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        dialog.on("yes", move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        dialog.show().unwrap();
        doc.release(dialog.root().unwrap()).unwrap();

        assert!(dialog.dismiss("yes").is_err());
        assert!(dialog.is_active());
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn dropping_document_and_dialog_frees_handlers() {
        let token = Rc::new(());
        {
            let doc = Document::new();
            let dialog = Dialog::create(&doc, yes_no()).unwrap();
            let held = Rc::clone(&token);
            dialog.on("yes", move |_| {
                let _ = &held;
                Ok(())
            });
            dialog.show().unwrap();
            assert_eq!(Rc::strong_count(&token), 2);
        }
        assert_eq!(Rc::strong_count(&token), 1);
    }

    #[test]
    fn shown_dialog_keeps_working_without_handles() {
        let doc = Document::new();
        let hits = Rc::new(Cell::new(0));
        let yes = {
            let dialog = Dialog::create(&doc, yes_no()).unwrap();
            let counter = Rc::clone(&hits);
            dialog.on("yes", move |_| {
                counter.set(counter.get() + 1);
                Ok(())
            });
            dialog.show().unwrap();
            dialog.button("yes").unwrap()
        };
        assert!(doc.dispatch(yes, Event::click()).unwrap().is_ok());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn dialog_outliving_its_document_is_detached() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, yes_no()).unwrap();
        let torn_down = Rc::new(Cell::new(false));
        let flag = Rc::clone(&torn_down);
        dialog.on("destroy", move |_| {
            flag.set(true);
            Ok(())
        });
        drop(doc);

        assert!(dialog.document().is_none());
        assert!(matches!(dialog.show(), Err(DialogError::Detached)));
        dialog.destroy().unwrap();
        assert!(torn_down.get());
    }

    #[traced_test]
    #[test]
    fn transitions_are_logged() {
        let doc = Document::new();
        let dialog = Dialog::create(&doc, yes_no()).unwrap();
        dialog.show().unwrap();
        dialog.dismiss("yes").unwrap();
        dialog.destroy().unwrap();
        assert!(logs_contain("dialog shown"));
        assert!(logs_contain("dialog dismissed"));
        assert!(logs_contain("dialog destroyed"));
    }
}
