//! # waymark
//!
//! A minimal HTTP router with a server-side session store.
//!
//! - **Routing**: `/`-delimited patterns with `:name` variables, tried in
//!   registration order, first match wins.
//! - **Sessions**: a 256-bit random identifier in the `SID` cookie, mapped
//!   to a server-side record holding an optional principal of your type.
//! - **Failure isolation**: a panicking handler becomes one HTTP error
//!   response; the connection and the process carry on.
//!
//! Everything else (TLS, rate limiting, method filtering, session expiry)
//! is left to the proxy in front or to your handlers.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use waymark::{Context, Response, Router, Server, StatusCode};
//!
//! #[derive(Debug)]
//! struct User { name: String }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), waymark::Error> {
//!     let app = Router::new()
//!         .route("/", index)?
//!         .route("/login/:name", login)?
//!         .route("/project/:projectId", project)?;
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn index(ctx: Context<User>) -> Response {
//!     match ctx.session().principal() {
//!         Some(user) => Response::text(format!("hello, {}", user.name)),
//!         None => Response::text("hello, stranger"),
//!     }
//! }
//!
//! async fn login(ctx: Context<User>) -> Response {
//!     let name = ctx.param("name").unwrap_or_default().to_owned();
//!     match ctx.login(User { name }) {
//!         Ok(_) => Response::status(StatusCode::NO_CONTENT),
//!         Err(_) => Response::status(StatusCode::SERVICE_UNAVAILABLE),
//!     }
//! }
//!
//! async fn project(ctx: Context<User>) -> Response {
//!     if !ctx.is_logged_in() {
//!         return Response::status(StatusCode::UNAUTHORIZED);
//!     }
//!     Response::text(format!("project {}", ctx.param("projectId").unwrap_or("?")))
//! }
//! ```

mod context;
mod dispatch;
mod error;
mod failure;
mod handler;
mod pattern;
mod response;
mod router;
mod server;
mod session;

pub use context::Context;
pub use error::{Error, RouteError, SessionError};
pub use failure::{FailureHandler, panic_message};
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use pattern::{Params, Pattern, Segment, SegmentKind};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::{Match, Route, Router};
pub use server::Server;
pub use session::{RenderInfo, SameSite, Session, SessionConfig, SessionStore};
