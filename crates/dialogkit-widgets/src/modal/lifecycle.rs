#![forbid(unsafe_code)]

//! Document-free dialog state machine.
//!
//! ```text
//!             show                 dismiss(role)
//!  Inactive ───────▶ Active ───────────────────▶ Inactive
//!      │               │  show (no-op)
//!      └──── destroy ──┴──────────────▶ Destroyed (terminal)
//! ```
//!
//! Transitions return the handlers to run instead of running them, so the
//! caller can release any borrow of the machine first.

use std::fmt;

use dialogkit_core::Role;
use tracing::trace;

use super::dialog::DialogError;
use super::handlers::{Handler, HandlerTable};

/// Dialog lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Built or dismissed; not visible.
    #[default]
    Inactive,
    /// Shown and awaiting a dismissal.
    Active,
    /// Torn down. Terminal.
    Destroyed,
}

/// Lifecycle state plus the handler table.
#[derive(Debug, Default)]
pub struct DialogMachine {
    state: Lifecycle,
    handlers: HandlerTable,
}

impl DialogMachine {
    /// Create an inactive machine with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == Lifecycle::Active
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state == Lifecycle::Destroyed
    }

    /// Registered handlers.
    #[must_use]
    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    /// Register a role handler. Last write wins.
    pub fn on(&mut self, role: impl Into<Role>, handler: Handler) {
        self.handlers.set(role, handler);
    }

    /// Register the always-handler.
    pub fn always(&mut self, handler: Handler) {
        self.handlers.set_always(handler);
    }

    /// Enter [`Lifecycle::Active`].
    ///
    /// Returns `Ok(true)` when the dialog was inactive, `Ok(false)` when it
    /// was already active.
    pub fn show(&mut self) -> Result<bool, DialogError> {
        match self.state {
            Lifecycle::Destroyed => Err(DialogError::Destroyed),
            Lifecycle::Active => Ok(false),
            Lifecycle::Inactive => {
                self.state = Lifecycle::Active;
                Ok(true)
            }
        }
    }

    /// Leave [`Lifecycle::Active`] for `role`.
    ///
    /// Returns `None` (nothing to run) unless the dialog is active.
    pub fn dismiss(&mut self, role: Role) -> Option<Dismissal> {
        if self.state != Lifecycle::Active {
            trace!(role = %role, state = ?self.state, "dismiss ignored");
            return None;
        }
        self.state = Lifecycle::Inactive;
        // An empty role dismisses without a role handler.
        let handler = if role.as_str().is_empty() {
            None
        } else {
            self.handlers.get(role.as_str())
        };
        Some(Dismissal {
            role,
            handler,
            always: self.handlers.always(),
        })
    }

    /// Enter [`Lifecycle::Destroyed`].
    ///
    /// Yields the destroy handler exactly once; later calls return `None`.
    pub fn destroy(&mut self) -> Option<Teardown> {
        if self.state == Lifecycle::Destroyed {
            return None;
        }
        self.state = Lifecycle::Destroyed;
        Some(Teardown {
            handler: self.handlers.get(Role::DESTROY),
        })
    }
}

/// Handlers to run for one dismissal, in order.
pub struct Dismissal {
    role: Role,
    handler: Option<Handler>,
    always: Option<Handler>,
}

impl Dismissal {
    /// Role that triggered the dismissal.
    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Run the role handler, then the always-handler.
    ///
    /// A failing role handler stops before the always-handler.
    pub fn run(self) -> Result<(), DialogError> {
        for handler in [self.handler.as_ref(), self.always.as_ref()]
            .into_iter()
            .flatten()
        {
            handler(&self.role).map_err(|source| DialogError::Handler {
                role: self.role.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Dismissal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dismissal")
            .field("role", &self.role)
            .field("handler", &self.handler.is_some())
            .field("always", &self.always.is_some())
            .finish()
    }
}

/// The destroy handler, if one was registered.
pub struct Teardown {
    handler: Option<Handler>,
}

impl Teardown {
    /// Run the destroy handler with the `"destroy"` role.
    pub fn run(self) -> Result<(), DialogError> {
        let Some(handler) = self.handler else {
            return Ok(());
        };
        let role = Role::destroy();
        handler(&role).map_err(|source| DialogError::Handler { role, source })
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("handler", &self.handler.is_some())
            .finish()
    }
}
