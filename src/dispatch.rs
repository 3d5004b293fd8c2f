//! Request dispatch: session, route, handler, and the unwind boundary.
//!
//! ```text
//! request ─▶ SID cookie ─▶ SessionStore::lookup ─▶ Router::lookup ─┬─ none ─▶ 404
//!                                                                  ▼
//!                                              catch_unwind(handler(ctx))
//!                                                  │ ok        │ panic
//!                                                  ▼           ▼
//!                                              response    FailureHandler / 500
//!                                                  └─────┬─────┘
//!                                                        ▼
//!                                               + queued Set-Cookie
//! ```
//!
//! Every request produces exactly one [`Response`]. A panicking handler, or
//! a panicking failure handler, never unwinds past [`Router::handle`].

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::FutureExt;
use http::StatusCode;
use tracing::{debug, error};

use crate::context::{Context, CookieQueue};
use crate::failure::{GENERIC_FAILURE, panic_message};
use crate::response::Response;
use crate::router::Router;
use crate::session::{Session, session_id_from};

impl<P: Send + Sync + 'static> Router<P> {
    /// Routes one request and produces its response.
    ///
    /// [`Server`](crate::Server) calls this for every request; it is public
    /// so applications can drive the router from tests or another transport.
    pub async fn handle(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();

        let sid = session_id_from(&parts.headers, self.sessions.config().name());
        let session = match &sid {
            Some(sid) => self.sessions.lookup(sid),
            None => Arc::new(Session::anonymous()),
        };

        let Some(matched) = self.lookup(parts.uri.path()) else {
            debug!(path = parts.uri.path(), "no route matched");
            return not_found();
        };
        let handler = Arc::clone(&matched.route.handler);

        let cookies = CookieQueue::default();
        let ctx = Context::new(
            parts,
            body,
            matched.params,
            sid,
            session,
            self.sessions.clone(),
            cookies.clone(),
        );

        // The handler is called inside the async block so a panic while
        // building its future is caught too.
        let outcome = AssertUnwindSafe(async move { handler.call(ctx).await })
            .catch_unwind()
            .await;

        let mut response = match outcome {
            Ok(response) => response,
            Err(payload) => self.failure_response(payload),
        };
        for cookie in cookies.take() {
            response.push_cookie(&cookie);
        }
        response
    }

    fn failure_response(&self, payload: Box<dyn Any + Send>) -> Response {
        error!(
            panic = panic_message(payload.as_ref()).unwrap_or("<non-string payload>"),
            "handler panicked"
        );

        let Some(translate) = &self.failure else {
            return internal_error();
        };
        match catch_unwind(AssertUnwindSafe(|| translate.http_error_for_panic(payload.as_ref()))) {
            Ok((status, message)) => Response::error(status, message),
            Err(_) => {
                error!("failure handler panicked");
                internal_error()
            }
        }
    }
}

fn not_found() -> Response {
    let status = StatusCode::NOT_FOUND;
    Response::error(status, status.canonical_reason().unwrap_or("Not Found"))
}

fn internal_error() -> Response {
    Response::error(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
}
