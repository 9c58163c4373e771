#![forbid(unsafe_code)]

//! Long-lived delete confirmation.
//!
//! One [`DeleteConfirmation`] owns one confirm dialog for a page. Each
//! [`request`](DeleteConfirmation::request) hands it the item to delete and
//! shows the dialog; confirming passes that item to the [`DeleteEndpoint`].
//! The dialog is built on first use and reused until
//! [`close`](DeleteConfirmation::close) destroys it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use dialogkit_core::Role;
use dialogkit_dom::Document;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::modal::{
    ButtonSpec, CANCEL_LABEL, Dialog, DialogConfig, DialogError, DialogSpec, HandlerError,
};

/// Role of the button that confirms the delete.
pub const CONFIRM_ROLE: &str = "confirm";

/// Item a delete request refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTarget {
    /// Resource to delete.
    pub url: String,
    /// Human-readable name, for logs and callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DeleteTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: None,
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Failures reported by a [`DeleteEndpoint`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    /// The server answered with a non-success status.
    #[error("server rejected delete of {url} with status {status}")]
    Rejected { url: String, status: u16 },
    /// The request never completed.
    #[error("delete request for {url} failed: {reason}")]
    Failed { url: String, reason: String },
}

impl From<EndpointError> for HandlerError {
    fn from(err: EndpointError) -> Self {
        HandlerError::new(err)
    }
}

/// Performs the delete once the user confirms.
///
/// Method, credentials, and response handling are up to the implementor.
pub trait DeleteEndpoint {
    fn delete(&self, target: &DeleteTarget) -> Result<(), EndpointError>;
}

impl<E: DeleteEndpoint + ?Sized> DeleteEndpoint for Rc<E> {
    fn delete(&self, target: &DeleteTarget) -> Result<(), EndpointError> {
        (**self).delete(target)
    }
}

/// Labels of the confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteText {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl Default for DeleteText {
    fn default() -> Self {
        Self {
            title: "Ta bort".into(),
            message: "Vill du verkligen ta bort detta?".into(),
            confirm_label: "Ta bort".into(),
            cancel_label: CANCEL_LABEL.into(),
        }
    }
}

#[derive(Default)]
struct State {
    dialog: Option<Dialog>,
    pending: Option<DeleteTarget>,
}

/// Owner of the page's delete confirmation dialog.
///
/// The dialog's subtree stays in the document until [`close`](Self::close)
/// is called.
pub struct DeleteConfirmation<E> {
    document: Document,
    endpoint: Rc<E>,
    text: DeleteText,
    config: DialogConfig,
    state: Rc<RefCell<State>>,
}

impl<E: DeleteEndpoint + 'static> DeleteConfirmation<E> {
    /// Create a coordinator. No dialog is built until the first request.
    pub fn new(document: &Document, endpoint: E) -> Self {
        Self {
            document: document.clone(),
            endpoint: Rc::new(endpoint),
            text: DeleteText::default(),
            config: DialogConfig::default(),
            state: Rc::default(),
        }
    }

    /// Replace the dialog labels. Applies to dialogs built afterwards.
    #[must_use]
    pub fn with_text(mut self, text: DeleteText) -> Self {
        self.text = text;
        self
    }

    /// Replace the dialog configuration. Applies to dialogs built afterwards.
    #[must_use]
    pub fn with_config(mut self, config: DialogConfig) -> Self {
        self.config = config;
        self
    }

    /// Ask the user to confirm deleting `target`.
    ///
    /// A request made while the dialog is open replaces the pending target.
    pub fn request(&self, target: DeleteTarget) -> Result<(), DialogError> {
        let dialog = self.dialog()?;
        debug!(url = %target.url, "delete confirmation requested");
        self.state.borrow_mut().pending = Some(target);
        dialog.show()?;
        Ok(())
    }

    /// Target awaiting confirmation.
    #[must_use]
    pub fn pending(&self) -> Option<DeleteTarget> {
        self.state.borrow().pending.clone()
    }

    /// Whether the dialog is currently built.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.state.borrow().dialog.is_some()
    }

    /// The confirmation dialog, built on first call.
    pub fn dialog(&self) -> Result<Dialog, DialogError> {
        if let Some(dialog) = &self.state.borrow().dialog {
            return Ok(dialog.clone());
        }
        let dialog = self.build()?;
        self.state.borrow_mut().dialog = Some(dialog.clone());
        Ok(dialog)
    }

    /// Destroy the dialog. The next request builds a fresh one.
    pub fn close(&self) -> Result<(), DialogError> {
        let dialog = self.state.borrow().dialog.clone();
        match dialog {
            Some(dialog) => dialog.destroy(),
            None => Ok(()),
        }
    }

    fn build(&self) -> Result<Dialog, DialogError> {
        let spec = DialogSpec::builder(self.text.title.as_str(), self.text.message.as_str())
            .button(
                ButtonSpec::new(CONFIRM_ROLE, self.text.confirm_label.as_str()).style("is-danger"),
            )
            .button(ButtonSpec::new(Role::CANCEL, self.text.cancel_label.as_str()))
            .build();
        let dialog = Dialog::create_with_config(&self.document, spec, self.config.clone())?;

        let state = Rc::downgrade(&self.state);
        let endpoint = Rc::clone(&self.endpoint);
        dialog.on(CONFIRM_ROLE, move |_| {
            let Some(target) = take_pending(&state) else {
                trace!("delete confirmed with nothing pending");
                return Ok(());
            };
            debug!(url = %target.url, "delete confirmed");
            endpoint.delete(&target)?;
            Ok(())
        });

        let state = Rc::downgrade(&self.state);
        dialog.on(Role::CANCEL, move |_| {
            if let Some(target) = take_pending(&state) {
                debug!(url = %target.url, "delete cancelled");
            }
            Ok(())
        });

        let state = Rc::downgrade(&self.state);
        dialog.on(Role::DESTROY, move |_| {
            if let Some(state) = state.upgrade() {
                let mut state = state.borrow_mut();
                state.dialog = None;
                state.pending = None;
            }
            Ok(())
        });

        Ok(dialog)
    }
}

fn take_pending(state: &Weak<RefCell<State>>) -> Option<DeleteTarget> {
    state.upgrade()?.borrow_mut().pending.take()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogkit_core::event::{Event, KeyCode};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        deleted: RefCell<Vec<String>>,
        reject: bool,
    }

    impl DeleteEndpoint for Recorder {
        fn delete(&self, target: &DeleteTarget) -> Result<(), EndpointError> {
            if self.reject {
                return Err(EndpointError::Rejected {
                    url: target.url.clone(),
                    status: 403,
                });
            }
            self.deleted.borrow_mut().push(target.url.clone());
            Ok(())
        }
    }

    fn setup() -> (Document, Rc<Recorder>, DeleteConfirmation<Rc<Recorder>>) {
        let doc = Document::new();
        let endpoint = Rc::new(Recorder::default());
        let confirmation = DeleteConfirmation::new(&doc, Rc::clone(&endpoint));
        (doc, endpoint, confirmation)
    }

    #[test]
    fn dialog_is_built_lazily_and_reused() {
        let (doc, _, confirmation) = setup();
        assert!(!confirmation.is_built());
        assert!(doc.children(doc.body()).unwrap().is_empty());

        confirmation.request(DeleteTarget::new("/posts/1")).unwrap();
        let first = confirmation.dialog().unwrap();
        confirmation.dialog().unwrap().dismiss(Role::CANCEL).unwrap();
        confirmation.request(DeleteTarget::new("/posts/2")).unwrap();
        assert!(first.ptr_eq(&confirmation.dialog().unwrap()));
        assert_eq!(doc.children(doc.body()).unwrap().len(), 1);
    }

    #[test]
    fn confirm_deletes_pending_target() {
        let (doc, endpoint, confirmation) = setup();
        confirmation
            .request(DeleteTarget::new("/posts/7").label("My post"))
            .unwrap();
        assert_eq!(confirmation.pending().unwrap().label.as_deref(), Some("My post"));

        let dialog = confirmation.dialog().unwrap();
        let outcome = doc
            .dispatch(dialog.button(CONFIRM_ROLE).unwrap(), Event::click())
            .unwrap();
        assert!(outcome.is_ok());
        assert_eq!(*endpoint.deleted.borrow(), vec!["/posts/7"]);
        assert_eq!(confirmation.pending(), None);
        assert!(!dialog.is_active());
    }

    #[test]
    fn escape_cancels_without_deleting() {
        let (doc, endpoint, confirmation) = setup();
        confirmation.request(DeleteTarget::new("/posts/3")).unwrap();
        let root = confirmation.dialog().unwrap().root().unwrap();

        let outcome = doc.dispatch(root, Event::key_down(KeyCode::Escape)).unwrap();
        assert!(outcome.default_prevented);
        assert!(endpoint.deleted.borrow().is_empty());
        assert_eq!(confirmation.pending(), None);
    }

    #[test]
    fn each_request_targets_its_own_item() {
        let (_, endpoint, confirmation) = setup();
        for url in ["/posts/1", "/posts/2"] {
            confirmation.request(DeleteTarget::new(url)).unwrap();
            confirmation.dialog().unwrap().dismiss(CONFIRM_ROLE).unwrap();
        }
        assert_eq!(*endpoint.deleted.borrow(), vec!["/posts/1", "/posts/2"]);
    }

    #[test]
    fn endpoint_error_reaches_caller() {
        let doc = Document::new();
        let confirmation = DeleteConfirmation::new(
            &doc,
            Recorder {
                reject: true,
                ..Recorder::default()
            },
        );
        confirmation.request(DeleteTarget::new("/posts/9")).unwrap();
        let err = confirmation
            .dialog()
            .unwrap()
            .dismiss(CONFIRM_ROLE)
            .unwrap_err();
        let (role, source) = match err {
            DialogError::Handler { role, source } => (role, source),
            other => panic!("expected handler error, got {other:?}"),
        };
        assert_eq!(role, CONFIRM_ROLE);
        assert_eq!(
            source.downcast_ref::<EndpointError>(),
            Some(&EndpointError::Rejected {
                url: "/posts/9".into(),
                status: 403
            })
        );
    }

    #[test]
    fn close_destroys_and_next_request_rebuilds() {
        let (doc, _, confirmation) = setup();
        confirmation.request(DeleteTarget::new("/posts/1")).unwrap();
        let first = confirmation.dialog().unwrap();
        confirmation.close().unwrap();

        assert!(!confirmation.is_built());
        assert!(first.is_destroyed());
        assert_eq!(confirmation.pending(), None);
        assert!(doc.children(doc.body()).unwrap().is_empty());

        confirmation.request(DeleteTarget::new("/posts/2")).unwrap();
        assert!(!first.ptr_eq(&confirmation.dialog().unwrap()));
        assert_eq!(confirmation.pending().unwrap().url, "/posts/2");
    }

    #[test]
    fn close_without_dialog_is_noop() {
        let (_, _, confirmation) = setup();
        confirmation.close().unwrap();
        assert!(!confirmation.is_built());
    }

    #[test]
    fn custom_text_is_rendered() {
        let doc = Document::new();
        let text = DeleteText {
            title: "Delete post".into(),
            confirm_label: "Delete".into(),
            ..DeleteText::default()
        };
        let confirmation = DeleteConfirmation::new(&doc, Recorder::default()).with_text(text);
        let dialog = confirmation.dialog().unwrap();
        let confirm = dialog.button(CONFIRM_ROLE).unwrap();
        assert_eq!(doc.text_content(confirm).unwrap(), "Delete");
        assert_eq!(
            doc.attribute(confirm, "class").unwrap().as_deref(),
            Some("button is-danger")
        );
    }
}
