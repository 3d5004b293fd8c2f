//! Per-request context handed to handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use cookie::Cookie;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};

use crate::error::SessionError;
use crate::pattern::Params;
use crate::session::{Session, SessionStore};

/// Everything a handler gets for one request: the request itself, the
/// captured path parameters, the visitor's session, and a way to change
/// that session.
///
/// Session changes made through [`login`](Context::login) and
/// [`logout`](Context::logout) take effect in the store immediately; the
/// matching `Set-Cookie` header is added to whatever response the handler
/// returns (error responses included).
pub struct Context<P = ()> {
    parts: Parts,
    body: Bytes,
    params: Params,
    sid: Option<String>,
    session: Arc<Session<P>>,
    sessions: SessionStore<P>,
    cookies: CookieQueue,
    issued: Mutex<Option<String>>,
}

impl<P> Context<P> {
    pub(crate) fn new(
        parts: Parts,
        body: Bytes,
        params: Params,
        sid: Option<String>,
        session: Arc<Session<P>>,
        sessions: SessionStore<P>,
        cookies: CookieQueue,
    ) -> Self {
        Self { parts, body, params, sid, session, sessions, cookies, issued: Mutex::new(None) }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The raw (still percent-encoded) request path.
    pub fn path(&self) -> &str { self.parts.uri.path() }

    /// Header lookup; `None` if absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/project/:projectId`, `ctx.param("projectId")` on
    /// `/project/42` returns `Some("42")`. The value is the raw path text.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &Params { &self.params }

    /// First value of query parameter `name`, form-urlencoded decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.parts.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// The session this request arrived with. Anonymous if the request had
    /// no session cookie or the cookie names no live session.
    pub fn session(&self) -> &Session<P> { &self.session }

    pub fn is_logged_in(&self) -> bool { self.session.is_logged_in() }

    /// Starts a new session for `principal` and queues the session cookie.
    ///
    /// A live session the request arrived with is ended first, as is one
    /// started by an earlier `login` on this same context: only the newest
    /// session survives and only its cookie is sent. The new session is
    /// visible to later requests; [`session`](Context::session) still
    /// reports the one this request arrived with.
    pub fn login(&self, principal: P) -> Result<String, SessionError> {
        let sid = self.sessions.init(principal)?;
        if let Some(old) = self.session.id() {
            self.sessions.clear(old);
        }
        if let Some(prev) = self.issued().replace(sid.clone()) {
            self.sessions.clear(&prev);
        }
        self.cookies.set(self.sessions.config().issue(&sid));
        Ok(sid)
    }

    /// Ends the session named by the request's cookie (and any session
    /// started by `login` on this context) and tells the client to drop the
    /// cookie. Does nothing if there is neither.
    pub fn logout(&self) {
        let issued = self.issued().take();
        if self.sid.is_none() && issued.is_none() {
            return;
        }
        for sid in self.sid.iter().chain(issued.iter()) {
            self.sessions.clear(sid);
        }
        self.cookies.set(self.sessions.config().removal());
    }

    /// Sends the current session's cookie again, e.g. after changing the
    /// cookie settings. Does nothing for an anonymous session.
    pub fn renew_cookie(&self) {
        if let Some(sid) = self.session.id() {
            self.cookies.set(self.sessions.config().issue(sid));
        }
    }

    fn issued(&self) -> MutexGuard<'_, Option<String>> {
        self.issued.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `Set-Cookie` values queued by a handler, drained by the dispatcher.
///
/// Shared between the context and the dispatcher so cookies survive a
/// handler that panics after queueing them.
#[derive(Clone, Default)]
pub(crate) struct CookieQueue(Arc<Mutex<Vec<Cookie<'static>>>>);

impl CookieQueue {
    /// Queues `cookie`, replacing any queued cookie with the same name.
    fn set(&self, cookie: Cookie<'static>) {
        let mut queue = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        queue.retain(|queued| queued.name() != cookie.name());
        queue.push(cookie);
    }

    pub(crate) fn take(&self) -> Vec<Cookie<'static>> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
