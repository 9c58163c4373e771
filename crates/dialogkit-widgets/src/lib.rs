#![forbid(unsafe_code)]

//! Dialog widgets for dialogkit.
//!
//! - [`modal`]: the [`Dialog`](modal::Dialog) component, its lifecycle state
//!   machine, handler registry, render template, and presets.
//! - [`confirm`]: a long-lived delete-confirmation dialog that forwards the
//!   confirmed target to a [`DeleteEndpoint`](confirm::DeleteEndpoint).

pub mod confirm;
pub mod modal;

pub use modal::{
    ButtonSpec, Dialog, DialogConfig, DialogError, DialogSpec, Handler, HandlerError,
    HandlerResult,
};
