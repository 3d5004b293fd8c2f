//! Session cookie settings and the `SID` cookie wire format.

use cookie::{Cookie, SameSite};
use http::HeaderMap;
use http::header::COOKIE;

/// How the session cookie is named and scoped.
///
/// Defaults: `SID`, path `/`, `HttpOnly`, `SameSite=Lax`, not `Secure`.
/// Turn on [`secure`](SessionConfig::secure) when the proxy in front
/// terminates TLS.
///
/// ```rust
/// use waymark::{SameSite, SessionConfig, SessionStore};
///
/// let store: SessionStore<String> = SessionStore::with_config(
///     SessionConfig::new().secure(true).same_site(SameSite::Strict),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct SessionConfig {
    cookie_name: String,
    cookie_path: String,
    http_only: bool,
    secure: bool,
    same_site: SameSite,
}

impl SessionConfig {
    pub const DEFAULT_COOKIE_NAME: &'static str = "SID";

    pub fn new() -> Self {
        Self {
            cookie_name: Self::DEFAULT_COOKIE_NAME.to_owned(),
            cookie_path: "/".to_owned(),
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn http_only(mut self, on: bool) -> Self {
        self.http_only = on;
        self
    }

    pub fn secure(mut self, on: bool) -> Self {
        self.secure = on;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    pub fn name(&self) -> &str { &self.cookie_name }

    /// The cookie that hands `sid` to the client. No expiry: it lasts for
    /// the browser session.
    pub fn issue(&self, sid: &str) -> Cookie<'static> {
        self.base(sid.to_owned()).build()
    }

    /// The cookie that tells the client to drop its session identifier:
    /// empty value, `Max-Age=0`, expiry in the past.
    pub fn removal(&self) -> Cookie<'static> {
        self.base(String::new()).removal().build()
    }

    fn base(&self, value: String) -> cookie::CookieBuilder<'static> {
        Cookie::build((self.cookie_name.clone(), value))
            .path(self.cookie_path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site)
    }
}

impl Default for SessionConfig {
    fn default() -> Self { Self::new() }
}

/// Extracts the session identifier from the request's `Cookie` headers.
///
/// Malformed pairs are skipped. If the cookie appears more than once the
/// first occurrence wins.
pub(crate) fn session_id_from(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_owned())
}
