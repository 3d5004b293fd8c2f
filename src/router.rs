//! Route table and path matching.
//!
//! Routes are kept in registration order and tried one by one. The first
//! route whose pattern matches the whole path wins; later routes are never
//! looked at, even if they are "more specific". Register narrow routes
//! before broad ones:
//!
//! ```text
//! /project/new          ← registered first, wins for /project/new
//! /project/:projectId   ← everything else under /project/
//! ```
//!
//! Lookup is O(routes × segments). Route tables are small and built once.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::RouteError;
use crate::failure::FailureHandler;
use crate::handler::{BoxedHandler, Handler};
use crate::pattern::{Params, Pattern};
use crate::session::SessionStore;

/// A registered pattern and its handler.
pub struct Route<P = ()> {
    pattern: Pattern,
    pub(crate) handler: BoxedHandler<P>,
}

impl<P> Route<P> {
    pub fn pattern(&self) -> &Pattern { &self.pattern }
}

/// The result of a successful [`Router::lookup`].
pub struct Match<'a, P = ()> {
    pub route: &'a Route<P>,
    pub params: Params,
}

/// The application router.
///
/// Built once at startup by chaining [`Router::route`] calls, then moved
/// into [`Server::serve`](crate::Server::serve). Registration takes `self`
/// by value and the server only ever sees the finished router, so lookups
/// can never race with registration.
///
/// `P` is the principal type stored in sessions; `()` when the application
/// only needs "logged in or not".
pub struct Router<P = ()> {
    routes: Vec<Route<P>>,
    pub(crate) sessions: SessionStore<P>,
    pub(crate) failure: Option<Arc<dyn FailureHandler>>,
}

impl<P: Send + Sync + 'static> Router<P> {
    /// An empty router with its own [`SessionStore`].
    pub fn new() -> Self {
        Self { routes: Vec::new(), sessions: SessionStore::new(), failure: None }
    }

    /// Registers `handler` for paths matching `pattern`. Returns `self` for
    /// chaining.
    ///
    /// Segments starting with `:` capture the path text at that position;
    /// `ctx.param("name")` retrieves it:
    ///
    /// ```rust
    /// # use waymark::{Context, Response, Router};
    /// # async fn index(_: Context) -> Response { Response::text("") }
    /// # async fn project(_: Context) -> Response { Response::text("") }
    /// # fn main() -> Result<(), waymark::RouteError> {
    /// let router = Router::new()
    ///     .route("/", index)?
    ///     .route("/project/:projectId", project)?;
    /// # Ok(()) }
    /// ```
    ///
    /// Fails if a segment is a bare `:`. Propagate the error with `?` so a
    /// broken route table stops the process at startup.
    pub fn route(mut self, pattern: &str, handler: impl Handler<P>) -> Result<Self, RouteError> {
        let pattern = Pattern::parse(pattern)?;
        for name in pattern.duplicate_variables() {
            warn!(route = %pattern, variable = name, "variable repeated; the last capture wins");
        }
        debug!(route = %pattern, position = self.routes.len(), "route registered");
        self.routes.push(Route { pattern, handler: handler.into_boxed_handler() });
        Ok(self)
    }

    /// Uses `store` for sessions instead of the router's own, e.g. to share
    /// one store with background tasks.
    pub fn sessions(mut self, store: SessionStore<P>) -> Self {
        self.sessions = store;
        self
    }

    /// Translates handler panics with `handler` instead of the generic
    /// `500 Internal server error`.
    pub fn on_failure(mut self, handler: impl FailureHandler) -> Self {
        self.failure = Some(Arc::new(handler));
        self
    }
}

impl<P> Router<P> {
    /// Finds the first route matching `path` and captures its variables.
    pub fn lookup(&self, path: &str) -> Option<Match<'_, P>> {
        let parts: Vec<&str> = path.split('/').collect();
        self.routes.iter().find_map(|route| {
            route.pattern.matches_parts(&parts).map(|params| Match { route, params })
        })
    }

    /// Registered routes, in priority order.
    pub fn routes(&self) -> impl Iterator<Item = &Route<P>> {
        self.routes.iter()
    }

    pub fn session_store(&self) -> &SessionStore<P> { &self.sessions }
}

impl<P: Send + Sync + 'static> Default for Router<P> {
    fn default() -> Self { Self::new() }
}
