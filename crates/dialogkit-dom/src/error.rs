#![forbid(unsafe_code)]

use crate::node::NodeId;

/// Failures of document operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The node id was never issued, or the node has been released.
    #[error("unknown or released node {0}")]
    UnknownNode(NodeId),
    /// The operation needs an element but got a text node.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    /// Appending would make a node its own ancestor.
    #[error("appending {child} to {parent} would create a cycle")]
    HierarchyCycle { parent: NodeId, child: NodeId },
    /// The `html` root and `body` cannot be moved or removed.
    #[error("node {0} is a document root and cannot be moved")]
    RootNode(NodeId),
    /// Attribute and class names must be non-empty and free of whitespace.
    #[error("invalid attribute or class name `{0}`")]
    InvalidName(String),
}
