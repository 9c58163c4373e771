#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use dialogkit_core::event::{Event, EventKind};
use tracing::{trace, warn};

use crate::error::DomError;
use crate::markup::{ElementMarkup, Markup};
use crate::node::{ElementData, ElementRef, Node, NodeId, NodeKind};

/// Error type listeners may return.
///
/// A failing listener does not stop dispatch to the remaining listeners; the
/// failure is reported in [`DispatchOutcome::failures`].
pub type ListenerError = Box<dyn std::error::Error + 'static>;

/// Result type returned by listeners.
pub type ListenerResult = Result<(), ListenerError>;

type Listener = Rc<dyn Fn(&mut EventContext) -> ListenerResult>;

struct ListenerEntry {
    kind: EventKind,
    callback: Listener,
}

/// State shared by the listeners of one dispatch.
#[derive(Debug, Clone)]
pub struct EventContext {
    event: Event,
    target: NodeId,
    current_target: NodeId,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl EventContext {
    fn new(event: Event, target: NodeId) -> Self {
        Self {
            event,
            target,
            current_target: target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// The event being dispatched.
    #[must_use]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Node the event was dispatched at.
    #[must_use]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose listener is running.
    #[must_use]
    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    /// Suppress the host's default action for this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a listener called [`prevent_default`](Self::prevent_default).
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop the event from reaching ancestors of the current node.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Result of [`Document::dispatch`].
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Whether any listener prevented the default action.
    pub default_prevented: bool,
    /// Number of listeners invoked.
    pub listeners_run: usize,
    /// Errors returned by listeners, in invocation order.
    pub failures: Vec<ListenerError>,
}

impl DispatchOutcome {
    /// Whether every listener succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Dom {
    nodes: Vec<Node>,
    /// Released slots, reused by `push`.
    free: Vec<usize>,
    html: NodeId,
    body: NodeId,
    active_element: Option<NodeId>,
    listeners: AHashMap<NodeId, Vec<ListenerEntry>>,
}

impl Dom {
    fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            html: NodeId::new(0, 0),
            body: NodeId::new(1, 0),
            active_element: None,
            listeners: AHashMap::new(),
        };
        let html = dom.push(NodeKind::Element(ElementData::new("html")));
        let body = dom.push(NodeKind::Element(ElementData::new("body")));
        dom.nodes[body.index()].parent = Some(html);
        dom.nodes[html.index()].children.push(body);
        dom
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.nodes[index];
            slot.kind = kind;
            return NodeId::new(index, slot.generation);
        }
        let id = NodeId::new(self.nodes.len(), 0);
        self.nodes.push(Node::new(kind));
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        match self.nodes.get(id.index()) {
            Some(node)
                if node.generation == id.generation()
                    && !matches!(node.kind, NodeKind::Released) =>
            {
                Ok(node)
            }
            _ => Err(DomError::UnknownNode(id)),
        }
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.node(id)?;
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element(data) => Ok(data),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn is_root(&self, id: NodeId) -> bool {
        id == self.html || id == self.body
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node.index()].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|child| *child != id);
        }
        if let Some(active) = self.active_element
            && self.is_inclusive_ancestor(id, active)
        {
            self.active_element = None;
        }
    }

    /// Inclusive descendants of `root` in document order.
    fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.index()].children.iter().rev().copied());
        }
        out
    }

    fn build(&mut self, markup: &Markup, parent: NodeId, created: &mut Vec<NodeId>, top: bool) {
        match markup {
            Markup::Fragment(children) => {
                for child in children {
                    self.build(child, parent, created, top);
                }
            }
            Markup::Text(text) => {
                let id = self.push(NodeKind::Text(text.clone()));
                self.link(parent, id);
                if top {
                    created.push(id);
                }
            }
            Markup::Element(ElementMarkup {
                tag,
                attrs,
                children,
            }) => {
                let mut data = ElementData::new(tag.to_ascii_lowercase());
                for (name, value) in attrs {
                    data.set_attr(name, value.clone());
                }
                let id = self.push(NodeKind::Element(data));
                self.link(parent, id);
                if top {
                    created.push(id);
                }
                for child in children {
                    self.build(child, id, created, false);
                }
            }
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    fn to_markup(&self, id: NodeId) -> Result<Markup, DomError> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Text(text) => Ok(Markup::text(text.clone())),
            NodeKind::Element(data) => {
                let mut element = Markup::element(data.tag.clone());
                element.attrs = data.attrs.clone();
                for child in &node.children {
                    element.children.push(self.to_markup(*child)?);
                }
                Ok(element.into())
            }
            NodeKind::Released => Err(DomError::UnknownNode(id)),
        }
    }
}

/// Check an attribute or class name: non-empty, no whitespace.
pub fn validate_name(name: &str) -> Result<(), DomError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(DomError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// Shared handle to an in-memory document.
///
/// Cloning is cheap; all clones see the same tree. The handle is `!Send`:
/// a document lives on the thread that drives its host.
#[derive(Clone)]
pub struct Document {
    dom: Rc<RefCell<Dom>>,
}

/// Non-owning handle to a [`Document`].
///
/// Objects the document's listeners keep alive hold this instead of a
/// [`Document`], so dropping the last document handle frees the tree.
#[derive(Clone)]
pub struct WeakDocument {
    dom: Weak<RefCell<Dom>>,
}

impl WeakDocument {
    /// The document, unless every [`Document`] handle has been dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<Document> {
        self.dom.upgrade().map(|dom| Document { dom })
    }
}

impl fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDocument")
            .field("alive", &(self.dom.strong_count() > 0))
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dom = self.dom.borrow();
        f.debug_struct("Document")
            .field("nodes", &(dom.nodes.len() - dom.free.len()))
            .field("active_element", &dom.active_element)
            .finish()
    }
}

impl Document {
    /// Create a document containing only `<html><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dom: Rc::new(RefCell::new(Dom::new())),
        }
    }

    /// A handle that does not keep the document alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            dom: Rc::downgrade(&self.dom),
        }
    }

    /// The `html` root element.
    #[must_use]
    pub fn html(&self) -> NodeId {
        self.dom.borrow().html
    }

    /// The `body` element.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.dom.borrow().body
    }

    /// Whether two handles refer to the same document.
    #[must_use]
    pub fn same_document(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.dom, &other.dom)
    }

    // --- Tree construction ---

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.dom
            .borrow_mut()
            .push(NodeKind::Element(ElementData::new(tag.to_ascii_lowercase())))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.dom.borrow_mut().push(NodeKind::Text(text.into()))
    }

    /// Instantiate `markup` as the last children of `parent`.
    ///
    /// Returns the top-level nodes created (fragments are flattened).
    pub fn append_markup(&self, parent: NodeId, markup: &Markup) -> Result<Vec<NodeId>, DomError> {
        let mut dom = self.dom.borrow_mut();
        dom.element(parent)?;
        let mut created = Vec::new();
        dom.build(markup, parent, &mut created, true);
        Ok(created)
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    /// elsewhere.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let mut dom = self.dom.borrow_mut();
        dom.element(parent)?;
        dom.node(child)?;
        if dom.is_root(child) {
            return Err(DomError::RootNode(child));
        }
        if dom.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyCycle { parent, child });
        }
        dom.detach(child);
        dom.link(parent, child);
        Ok(())
    }

    /// Detach `node` from its parent. Detached nodes stay valid.
    ///
    /// Focus inside the removed subtree is cleared.
    pub fn remove(&self, node: NodeId) -> Result<(), DomError> {
        let mut dom = self.dom.borrow_mut();
        dom.node(node)?;
        if dom.is_root(node) {
            return Err(DomError::RootNode(node));
        }
        dom.detach(node);
        Ok(())
    }

    /// Detach `node` and invalidate it and its descendants, dropping their
    /// listeners.
    pub fn release(&self, node: NodeId) -> Result<(), DomError> {
        let dropped: Vec<ListenerEntry> = {
            let mut dom = self.dom.borrow_mut();
            dom.node(node)?;
            if dom.is_root(node) {
                return Err(DomError::RootNode(node));
            }
            dom.detach(node);
            let subtree = dom.subtree(node);
            let mut dropped = Vec::new();
            for id in &subtree {
                if let Some(entries) = dom.listeners.remove(id) {
                    dropped.extend(entries);
                }
                let slot = &mut dom.nodes[id.index()];
                slot.kind = NodeKind::Released;
                slot.children.clear();
                slot.parent = None;
                slot.generation = slot.generation.wrapping_add(1);
                dom.free.push(id.index());
            }
            trace!(node = %node, released = subtree.len(), "released subtree");
            dropped
        };
        // Listener captures may own handles to this document; drop them
        // after the borrow ends.
        drop(dropped);
        Ok(())
    }

    // --- Tree queries ---

    /// Parent of `node`, if attached.
    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.dom.borrow().node(node)?.parent)
    }

    /// Children of `node` in order.
    pub fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        Ok(self.dom.borrow().node(node)?.children.clone())
    }

    /// Whether `node` is attached to this document's `html` root.
    ///
    /// Unknown and released nodes are not connected.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        let dom = self.dom.borrow();
        dom.node(node).is_ok() && dom.is_inclusive_ancestor(dom.html, node)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> Result<bool, DomError> {
        let dom = self.dom.borrow();
        dom.node(ancestor)?;
        dom.node(node)?;
        Ok(dom.is_inclusive_ancestor(ancestor, node))
    }

    /// Lowercase tag name of an element.
    pub fn tag_name(&self, node: NodeId) -> Result<String, DomError> {
        Ok(self.dom.borrow().element(node)?.tag.clone())
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> Result<String, DomError> {
        let dom = self.dom.borrow();
        dom.node(node)?;
        let mut out = String::new();
        for id in dom.subtree(node) {
            if let NodeKind::Text(text) = &dom.nodes[id.index()].kind {
                out.push_str(text);
            }
        }
        Ok(out)
    }

    /// First element in `root`'s subtree (inclusive, document order) that
    /// satisfies `predicate`.
    pub fn find(
        &self,
        root: NodeId,
        predicate: impl Fn(ElementRef<'_>) -> bool,
    ) -> Result<Option<NodeId>, DomError> {
        Ok(self.find_all(root, predicate)?.into_iter().next())
    }

    /// All elements in `root`'s subtree (inclusive, document order) that
    /// satisfy `predicate`.
    pub fn find_all(
        &self,
        root: NodeId,
        predicate: impl Fn(ElementRef<'_>) -> bool,
    ) -> Result<Vec<NodeId>, DomError> {
        let dom = self.dom.borrow();
        dom.node(root)?;
        Ok(dom
            .subtree(root)
            .into_iter()
            .filter(|id| match &dom.nodes[id.index()].kind {
                NodeKind::Element(data) => predicate(ElementRef::new(*id, data)),
                _ => false,
            })
            .collect())
    }

    /// Serialize `node` and its subtree as HTML.
    pub fn outer_html(&self, node: NodeId) -> Result<String, DomError> {
        Ok(self.dom.borrow().to_markup(node)?.to_string())
    }

    // --- Attributes and classes ---

    /// Value of an attribute.
    pub fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.dom.borrow().element(node)?.attr(name).map(str::to_owned))
    }

    /// Set an attribute.
    pub fn set_attribute(
        &self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        validate_name(name)?;
        self.dom
            .borrow_mut()
            .element_mut(node)?
            .set_attr(name, value.into());
        Ok(())
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.dom.borrow_mut().element_mut(node)?.remove_attr(name))
    }

    /// Whether the element's class list contains `class`.
    pub fn has_class(&self, node: NodeId, class: &str) -> Result<bool, DomError> {
        Ok(self.dom.borrow().element(node)?.has_class(class))
    }

    /// Add a class. Returns `true` if it was not present.
    pub fn add_class(&self, node: NodeId, class: &str) -> Result<bool, DomError> {
        validate_name(class)?;
        Ok(self.dom.borrow_mut().element_mut(node)?.add_class(class))
    }

    /// Remove a class. Returns `true` if it was present.
    pub fn remove_class(&self, node: NodeId, class: &str) -> Result<bool, DomError> {
        validate_name(class)?;
        Ok(self.dom.borrow_mut().element_mut(node)?.remove_class(class))
    }

    /// Add the class if `force` is true, remove it otherwise.
    pub fn toggle_class(&self, node: NodeId, class: &str, force: bool) -> Result<(), DomError> {
        if force {
            self.add_class(node, class)?;
        } else {
            self.remove_class(node, class)?;
        }
        Ok(())
    }

    // --- Focus ---

    /// Move focus to `node`.
    ///
    /// Returns `false` and leaves focus unchanged when the element is not
    /// connected to the document.
    pub fn focus(&self, node: NodeId) -> Result<bool, DomError> {
        let mut dom = self.dom.borrow_mut();
        dom.element(node)?;
        if !dom.is_inclusive_ancestor(dom.html, node) {
            return Ok(false);
        }
        dom.active_element = Some(node);
        Ok(true)
    }

    /// Clear focus.
    pub fn blur(&self) {
        self.dom.borrow_mut().active_element = None;
    }

    /// Currently focused element.
    #[must_use]
    pub fn active_element(&self) -> Option<NodeId> {
        self.dom.borrow().active_element
    }

    // --- Events ---

    /// Register a listener for `kind` events reaching `node`.
    pub fn add_listener<F>(&self, node: NodeId, kind: EventKind, listener: F) -> Result<(), DomError>
    where
        F: Fn(&mut EventContext) -> ListenerResult + 'static,
    {
        let mut dom = self.dom.borrow_mut();
        dom.node(node)?;
        dom.listeners.entry(node).or_default().push(ListenerEntry {
            kind,
            callback: Rc::new(listener),
        });
        Ok(())
    }

    /// Number of listeners registered directly on `node`.
    #[must_use]
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.dom
            .borrow()
            .listeners
            .get(&node)
            .map_or(0, Vec::len)
    }

    /// Dispatch `event` at `target`, bubbling through its ancestors.
    ///
    /// Listeners run with no borrow of the document held. A listener that
    /// returns an error is logged and recorded; dispatch continues.
    pub fn dispatch(&self, target: NodeId, event: Event) -> Result<DispatchOutcome, DomError> {
        let path = {
            let dom = self.dom.borrow();
            dom.node(target)?;
            let mut path = vec![target];
            let mut cursor = dom.nodes[target.index()].parent;
            while let Some(node) = cursor {
                path.push(node);
                cursor = dom.nodes[node.index()].parent;
            }
            path
        };

        let kind = event.kind();
        let mut ctx = EventContext::new(event, target);
        let mut outcome = DispatchOutcome::default();

        for node in path {
            let listeners: Vec<Listener> = {
                let dom = self.dom.borrow();
                dom.listeners
                    .get(&node)
                    .map(|entries| {
                        entries
                            .iter()
                            .filter(|entry| entry.kind == kind)
                            .map(|entry| Rc::clone(&entry.callback))
                            .collect()
                    })
                    .unwrap_or_default()
            };
            ctx.current_target = node;
            for listener in listeners {
                outcome.listeners_run += 1;
                if let Err(err) = listener(&mut ctx) {
                    warn!(target_node = %target, current = %node, error = %err, "listener failed");
                    outcome.failures.push(err);
                }
            }
            if ctx.propagation_stopped {
                break;
            }
        }

        outcome.default_prevented = ctx.default_prevented;
        trace!(
            target_node = %target,
            ?kind,
            listeners = outcome.listeners_run,
            default_prevented = outcome.default_prevented,
            "dispatched event"
        );
        Ok(outcome)
    }
}
