#![forbid(unsafe_code)]

use std::error::Error;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use dialogkit_core::Role;

/// Error returned by a failing handler.
///
/// Wraps any error type. The dialog never inspects it; it is handed back to
/// whoever triggered the dismissal.
pub struct HandlerError {
    inner: Box<dyn Error + Send + Sync + 'static>,
}

impl HandlerError {
    /// Wrap an error or message.
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self {
            inner: error.into(),
        }
    }

    /// Borrow the wrapped error as `T`, if it is one.
    #[must_use]
    pub fn downcast_ref<T: Error + 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Unwrap into the boxed error.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn Error + Send + Sync + 'static> {
        self.inner
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerError").field(&self.inner).finish()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Result returned by handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Shared dismissal callback. Receives the role that triggered it.
pub type Handler = Rc<dyn Fn(&Role) -> HandlerResult>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(callback: F) -> Handler
where
    F: Fn(&Role) -> HandlerResult + 'static,
{
    Rc::new(callback)
}

/// Role → handler registry plus the always-handler slot.
///
/// The always-handler lives outside the role map, so no caller role can
/// shadow it.
#[derive(Clone, Default)]
pub struct HandlerTable {
    by_role: AHashMap<Role, Handler>,
    always: Option<Handler>,
}

impl HandlerTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `role`, returning the handler it replaced.
    pub fn set(&mut self, role: impl Into<Role>, handler: Handler) -> Option<Handler> {
        self.by_role.insert(role.into(), handler)
    }

    /// Register the always-handler, returning the one it replaced.
    pub fn set_always(&mut self, handler: Handler) -> Option<Handler> {
        self.always.replace(handler)
    }

    /// Handler for `role`, if any.
    #[must_use]
    pub fn get(&self, role: &str) -> Option<Handler> {
        self.by_role.get(role).cloned()
    }

    /// The always-handler, if any.
    #[must_use]
    pub fn always(&self) -> Option<Handler> {
        self.always.clone()
    }

    /// Whether a handler is registered for `role`.
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.by_role.contains_key(role)
    }

    /// Number of role handlers (the always-handler is not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_role.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_role.is_empty() && self.always.is_none()
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut roles: Vec<&str> = self.by_role.keys().map(Role::as_str).collect();
        roles.sort_unstable();
        f.debug_struct("HandlerTable")
            .field("roles", &roles)
            .field("always", &self.always.is_some())
            .finish()
    }
}
