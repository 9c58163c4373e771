#![forbid(unsafe_code)]

//! Modal dialog component, lifecycle state machine, handler registry, and presets.
//!
//! # Lifecycle
//!
//! A [`Dialog`] is built detached, inserted into the document body by
//! [`Dialog::show`], hidden again by [`Dialog::dismiss`], and torn down by
//! [`Dialog::destroy`]. Visibility is signalled only by the active class on
//! the root element (`is-active` by default); stylesheets do the rest.
//!
//! The state machine itself ([`DialogMachine`]) has no document dependency.
//! [`Dialog`] is a thin adapter that keeps the DOM in step with it and wires
//! button clicks and the Escape key to [`Dialog::dismiss`].
//!
//! # Handlers
//!
//! Handlers are keyed by [`Role`](dialogkit_core::Role). Registering a role
//! twice keeps the last handler. Every dismissal runs the role handler and
//! then the always-handler. The `"destroy"` role is run once on teardown.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use dialogkit_dom::Document;
//! use dialogkit_widgets::modal::{Dialog, DialogSpec};
//!
//! let doc = Document::new();
//! let dialog = Dialog::create(&doc, DialogSpec::confirm("Delete?", "This cannot be undone.")).unwrap();
//!
//! let confirmed = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&confirmed);
//! dialog.on("confirm", move |_| {
//!     flag.set(true);
//!     Ok(())
//! });
//!
//! dialog.show().unwrap();
//! dialog.dismiss("confirm").unwrap();
//! assert!(confirmed.get());
//! assert!(!dialog.is_active());
//! ```

mod config;
mod dialog;
mod handlers;
mod lifecycle;
mod spec;
pub mod template;

pub use config::DialogConfig;
pub use dialog::{Dialog, DialogError};
pub use handlers::{Handler, HandlerError, HandlerResult, HandlerTable, handler};
pub use lifecycle::{DialogMachine, Dismissal, Lifecycle, Teardown};
pub use spec::{ButtonSpec, CANCEL_LABEL, CONFIRM_LABEL, DialogSpec, DialogSpecBuilder, OK_LABEL};
