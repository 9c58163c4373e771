#![forbid(unsafe_code)]

//! Shared vocabulary for dialogkit.
//!
//! - [`Role`]: the open string key used for dialog dispatch.
//! - [`event`]: the small slice of DOM input events a dialog reacts to.

pub mod event;
mod role;

pub use role::Role;
