//! Server-side sessions.
//!
//! A client carries an opaque identifier in the `SID` cookie. The identifier
//! keys a [`Session`] held in a [`SessionStore`]; the session carries an
//! optional principal of whatever type the application needs.
//!
//! ```text
//!   absent ──init──▶ active ──clear──▶ absent
//! ```
//!
//! There is no expiry. A session lives until it is cleared.

mod config;
mod id;
mod store;

use std::fmt;
use std::time::SystemTime;

use serde::Serialize;

pub use config::SessionConfig;
pub use cookie::SameSite;
pub use store::SessionStore;

pub(crate) use config::session_id_from;

/// A session record.
///
/// Sessions handed out by [`SessionStore::lookup`] are shared with every
/// other request carrying the same identifier. Unknown or missing
/// identifiers resolve to an anonymous session: no id, no principal.
pub struct Session<P = ()> {
    id: Option<String>,
    created: SystemTime,
    principal: Option<P>,
}

impl<P> Session<P> {
    pub(crate) fn new(id: String, principal: P) -> Self {
        Self { id: Some(id), created: SystemTime::now(), principal: Some(principal) }
    }

    /// A session that is not in any store.
    pub fn anonymous() -> Self {
        Self { id: None, created: SystemTime::now(), principal: None }
    }

    /// The session identifier, or `None` for an anonymous session.
    pub fn id(&self) -> Option<&str> { self.id.as_deref() }
    pub fn created(&self) -> SystemTime { self.created }
    pub fn principal(&self) -> Option<&P> { self.principal.as_ref() }

    /// `true` when a principal is attached.
    pub fn is_logged_in(&self) -> bool {
        self.principal.is_some()
    }

    /// A serialisable view of the session for templates and JSON bodies.
    pub fn render_info(&self) -> RenderInfo<'_, P> {
        RenderInfo { logged_in: self.is_logged_in(), details: self.principal.as_ref() }
    }
}

// The id is a bearer credential; keep it out of logs.
impl<P: fmt::Debug> fmt::Debug for Session<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id.as_ref().map(|_| "<redacted>"))
            .field("created", &self.created)
            .field("principal", &self.principal)
            .finish()
    }
}

/// What a page needs to know about the current visitor.
#[derive(Debug, Serialize)]
pub struct RenderInfo<'a, P> {
    pub logged_in: bool,
    pub details: Option<&'a P>,
}
