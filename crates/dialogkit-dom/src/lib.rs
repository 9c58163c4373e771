#![forbid(unsafe_code)]

//! Host-driven document model.
//!
//! [`Document`] is a small, deterministic stand-in for the browser DOM: an
//! arena of element and text nodes with attributes, a class list, a focus
//! pointer, and event listeners. Hosts (a browser shim, or tests) feed input
//! through [`Document::dispatch`]; nothing happens behind their back.
//!
//! # Invariants
//!
//! - Every node has at most one parent; the tree never contains cycles.
//! - The `html` root and its `body` child always exist and are never removed.
//! - Released slots are reused, so the arena stays as large as the peak live
//!   tree. An id whose node was released fails every operation with
//!   [`DomError::UnknownNode`], even after its slot holds a new node.
//! - Listener dispatch never holds a borrow of the document, so listeners may
//!   mutate the document they were dispatched from.
//!
//! # Example
//!
//! ```
//! use dialogkit_dom::{Document, Markup};
//!
//! let doc = Document::new();
//! let panel = doc.create_element("div");
//! let hello = Markup::from(Markup::element("p").text("hello"));
//! doc.append_markup(panel, &hello).unwrap();
//! doc.append_child(doc.body(), panel).unwrap();
//! assert_eq!(doc.outer_html(panel).unwrap(), "<div><p>hello</p></div>");
//! ```

mod document;
mod error;
pub mod markup;
mod node;

pub use document::{
    DispatchOutcome, Document, EventContext, ListenerError, ListenerResult, WeakDocument,
    validate_name,
};
pub use error::DomError;
pub use markup::{ElementMarkup, Markup};
pub use node::{ElementRef, NodeId};
