//! The concurrent session map.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};

use super::config::SessionConfig;
use super::{Session, id};
use crate::error::SessionError;

/// Process-wide store of live sessions, keyed by session identifier.
///
/// Cloning a `SessionStore` clones a handle; every clone sees the same map.
/// Create one at startup and hand it to [`Router::sessions`](crate::Router::sessions),
/// or let [`Router::new`](crate::Router::new) create one for you.
///
/// The map is sharded ([`DashMap`]): operations on different identifiers
/// proceed in parallel, operations on the same identifier are serialised by
/// its shard lock.
pub struct SessionStore<P = ()> {
    sessions: Arc<DashMap<String, Arc<Session<P>>>>,
    config: Arc<SessionConfig>,
}

impl<P> SessionStore<P> {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self { sessions: Arc::new(DashMap::new()), config: Arc::new(config) }
    }

    pub fn config(&self) -> &SessionConfig { &self.config }

    /// Starts a session for `principal` and returns its new identifier.
    ///
    /// The identifier carries 256 bits from the operating system's CSPRNG.
    /// If the random source keeps failing the call returns
    /// [`SessionError::EntropyUnavailable`] and nothing is stored.
    pub fn init(&self, principal: P) -> Result<String, SessionError> {
        self.init_with(&mut OsRng, principal)
    }

    pub(crate) fn init_with<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        principal: P,
    ) -> Result<String, SessionError> {
        loop {
            let sid = id::generate(rng)?;
            match self.sessions.entry(sid) {
                Entry::Vacant(slot) => {
                    let sid = slot.key().clone();
                    slot.insert(Arc::new(Session::new(sid.clone(), principal)));
                    debug!(live = self.sessions.len(), "session started");
                    return Ok(sid);
                }
                Entry::Occupied(_) => warn!("session id collision, regenerating"),
            }
        }
    }

    /// Returns the session stored under `sid`, or a fresh anonymous session.
    ///
    /// Never fails and never modifies the store.
    pub fn lookup(&self, sid: &str) -> Arc<Session<P>> {
        self.sessions
            .get(sid)
            .map(|entry| Arc::clone(entry.value()))
            .unwrap_or_else(|| Arc::new(Session::anonymous()))
    }

    /// Ends the session stored under `sid`. A no-op if there is none.
    pub fn clear(&self, sid: &str) {
        if self.sessions.remove(sid).is_some() {
            debug!(live = self.sessions.len(), "session cleared");
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize { self.sessions.len() }
    pub fn is_empty(&self) -> bool { self.sessions.is_empty() }
}

impl<P> Clone for SessionStore<P> {
    fn clone(&self) -> Self {
        Self { sessions: Arc::clone(&self.sessions), config: Arc::clone(&self.config) }
    }
}

impl<P> Default for SessionStore<P> {
    fn default() -> Self { Self::new() }
}
