#![forbid(unsafe_code)]

//! dialogkit public facade.
//!
//! Modal dialogs rendered into a host-driven document model. The document
//! ([`dom::Document`]) is fed input by its host; dialogs
//! ([`widgets::modal::Dialog`]) listen for clicks and Escape, track an
//! active/inactive lifecycle, and dispatch each dismissal to role handlers.
//!
//! # Example
//!
//! ```
//! use dialogkit::prelude::*;
//!
//! let doc = Document::new();
//! let spec = DialogSpec::builder("Confirm", "Delete this?")
//!     .button(ButtonSpec::new("yes", "Delete").style("is-danger"))
//!     .button(ButtonSpec::new("no", "Cancel"))
//!     .build();
//! let dialog = Dialog::create(&doc, spec)?;
//! dialog
//!     .on("yes", |role| {
//!         println!("confirmed with {role}");
//!         Ok(())
//!     })
//!     .show()?;
//!
//! // The host delivers a click on the "yes" button.
//! let yes = dialog.button("yes").expect("rendered");
//! doc.dispatch(yes, Event::click())?;
//! assert!(!dialog.is_active());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use dialogkit_core::event;
pub use dialogkit_dom as dom;
pub use dialogkit_widgets as widgets;

pub use dialogkit_core::Role;
pub use dialogkit_dom::{Document, DomError, Markup, NodeId};
pub use dialogkit_widgets::modal::{
    ButtonSpec, Dialog, DialogConfig, DialogError, DialogSpec, HandlerError, HandlerResult,
};

#[cfg(feature = "confirm")]
pub use dialogkit_widgets::confirm::{
    DeleteConfirmation, DeleteEndpoint, DeleteTarget, DeleteText, EndpointError,
};

/// Commonly used types.
pub mod prelude {
    pub use dialogkit_core::Role;
    pub use dialogkit_core::event::{Event, EventKind, KeyCode, Modifiers};
    pub use dialogkit_dom::{Document, Markup, NodeId};
    pub use dialogkit_widgets::modal::{
        ButtonSpec, Dialog, DialogConfig, DialogError, DialogSpec, HandlerError, HandlerResult,
    };

    #[cfg(feature = "confirm")]
    pub use dialogkit_widgets::confirm::{DeleteConfirmation, DeleteEndpoint, DeleteTarget};
}
