#![forbid(unsafe_code)]

use std::fmt;

/// Handle to a node in a [`Document`](crate::Document).
///
/// Ids are only meaningful for the document that issued them. Arena slots
/// are reused after a release; the generation tells a stale id from the
/// node that now occupies its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena index of this node.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// How many times the slot had been released when this id was issued.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ElementData {
    pub(crate) tag: String,
    /// Attributes in insertion order; names are unique.
    pub(crate) attrs: Vec<(String, String)>,
}

impl ElementData {
    pub(crate) fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn set_attr(&mut self, name: &str, value: String) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
    }

    pub(crate) fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(idx).1)
    }

    pub(crate) fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").into_iter().flat_map(str::split_ascii_whitespace)
    }

    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Returns `true` if the class was added.
    pub(crate) fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        let mut list: Vec<&str> = self.classes().collect();
        list.push(class);
        let joined = list.join(" ");
        self.set_attr("class", joined);
        true
    }

    /// Returns `true` if the class was present.
    pub(crate) fn remove_class(&mut self, class: &str) -> bool {
        if !self.has_class(class) {
            return false;
        }
        let joined = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", joined);
        true
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Element(ElementData),
    Text(String),
    /// Tombstone left by `Document::release`.
    Released,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
    /// Bumped on every release of this slot.
    pub(crate) generation: u32,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind,
            generation: 0,
        }
    }
}

/// Read-only view of an element, handed to query predicates.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    id: NodeId,
    data: &'a ElementData,
}

impl<'a> ElementRef<'a> {
    pub(crate) fn new(id: NodeId, data: &'a ElementData) -> Self {
        Self { id, data }
    }

    /// Id of the element.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self) -> &'a str {
        &self.data.tag
    }

    /// Value of an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data.attr(name)
    }

    /// Whether the element's class list contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.data.has_class(class)
    }
}
