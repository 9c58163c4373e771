#![forbid(unsafe_code)]

//! Dialog roles.
//!
//! A role names a button or a dismissal reason. Any string is a valid role;
//! a role that nothing handles simply has no effect when it fires.

use std::borrow::Borrow;
use std::fmt;

/// Caller-chosen identifier for a dialog button or dismissal reason.
///
/// Roles are compared by their string content. `Role` borrows as `str`, so
/// maps keyed by `Role` can be queried with a plain `&str`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Role(String);

impl Role {
    /// Role fired by Escape and by the close control in the dialog header.
    pub const CANCEL: &'static str = "cancel";

    /// Role under which the teardown handler is registered.
    pub const DESTROY: &'static str = "destroy";

    /// Create a role from any string.
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    /// The `"cancel"` role.
    #[must_use]
    pub fn cancel() -> Self {
        Self::new(Self::CANCEL)
    }

    /// The `"destroy"` role.
    #[must_use]
    pub fn destroy() -> Self {
        Self::new(Self::DESTROY)
    }

    /// Borrow the role as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the `"cancel"` role.
    #[inline]
    #[must_use]
    pub fn is_cancel(&self) -> bool {
        self.0 == Self::CANCEL
    }

    /// Consume the role, returning the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        Self::new(role)
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        Self(role)
    }
}

impl From<&Role> for Role {
    fn from(role: &Role) -> Self {
        role.clone()
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Role {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Role {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Role {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
