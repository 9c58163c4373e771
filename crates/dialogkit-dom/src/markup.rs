#![forbid(unsafe_code)]

//! Declarative markup trees.
//!
//! A [`Markup`] value describes a DOM fragment. It can be serialized to an
//! HTML string through [`Display`](std::fmt::Display) (text and attribute
//! values are escaped) or instantiated into a [`Document`](crate::Document)
//! with [`Document::append_markup`](crate::Document::append_markup).

use std::borrow::Cow;
use std::fmt::{self, Write as _};

/// A markup node: an element, a text run, or a fragment of siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Element(ElementMarkup),
    Text(String),
    Fragment(Vec<Markup>),
}

impl Markup {
    /// Start building an element.
    pub fn element(tag: impl Into<String>) -> ElementMarkup {
        ElementMarkup {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// A sequence of sibling nodes without a wrapping element.
    pub fn fragment(children: impl IntoIterator<Item = Markup>) -> Self {
        Self::Fragment(children.into_iter().collect())
    }
}

impl From<ElementMarkup> for Markup {
    fn from(element: ElementMarkup) -> Self {
        Self::Element(element)
    }
}

/// An element with attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementMarkup {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Markup>,
}

impl ElementMarkup {
    /// Set an attribute, replacing an earlier value with the same name.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Set the `class` attribute.
    #[must_use]
    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    /// Append a child node.
    #[must_use]
    pub fn child(mut self, child: impl Into<Markup>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several child nodes.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Markup>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a text child.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Markup::text(text))
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(element) => fmt::Display::fmt(element, f),
            Self::Text(text) => f.write_str(&escape_text(text)),
            Self::Fragment(children) => children
                .iter()
                .try_for_each(|child| fmt::Display::fmt(child, f)),
        }
    }
}

impl fmt::Display for ElementMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attrs {
            write!(f, " {name}=\"{}\"", escape_attr(value))?;
        }
        f.write_char('>')?;
        for child in &self.children {
            fmt::Display::fmt(child, f)?;
        }
        write!(f, "</{}>", self.tag)
    }
}

/// Escape text content for HTML.
#[must_use]
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, false)
}

/// Escape a double-quoted attribute value for HTML.
#[must_use]
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    escape(value, true)
}

fn escape(input: &str, quotes: bool) -> Cow<'_, str> {
    let needs = |c: char| matches!(c, '&' | '<' | '>') || (quotes && matches!(c, '"' | '\''));
    if !input.contains(needs) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            '\'' if quotes => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
