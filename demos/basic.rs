//! Minimal waymark demo: login/logout with a session cookie and a
//! parameterised route.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -c jar -b jar http://localhost:3000/
//!   curl -c jar -b jar http://localhost:3000/login/alice
//!   curl -c jar -b jar http://localhost:3000/project/7
//!   curl -c jar -b jar http://localhost:3000/me
//!   curl -c jar -b jar http://localhost:3000/logout
//!   curl http://localhost:3000/explode

use std::any::Any;

use serde::Serialize;
use waymark::{Context, Response, Router, Server, StatusCode, panic_message};

#[derive(Debug, Serialize)]
struct User {
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), waymark::Error> {
    tracing_subscriber::fmt::init();

    // Narrow routes before broad ones: the first match wins.
    let app = Router::new()
        .route("/", index)?
        .route("/me", me)?
        .route("/login/:name", login)?
        .route("/logout", logout)?
        .route("/project/new", new_project)?
        .route("/project/:projectId", show_project)?
        .route("/explode", explode)?
        .on_failure(|payload: &(dyn Any + Send)| {
            let detail = panic_message(payload).unwrap_or("unknown failure");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("something broke: {detail}"))
        });

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

// GET /
async fn index(ctx: Context<User>) -> Response {
    match ctx.session().principal() {
        Some(user) => Response::text(format!("welcome back, {}", user.name)),
        None => Response::text("hello, stranger. try /login/<name>"),
    }
}

// GET /me → the session's render info as JSON
async fn me(ctx: Context<User>) -> Response {
    match serde_json::to_vec(&ctx.session().render_info()) {
        Ok(bytes) => Response::json(bytes),
        Err(_) => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

// GET /login/:name
async fn login(ctx: Context<User>) -> Response {
    let name = ctx.param("name").unwrap_or("anonymous").to_owned();
    match ctx.login(User { name }) {
        Ok(_) => Response::builder()
            .status(StatusCode::SEE_OTHER)
            .header("location", "/")
            .no_body(),
        Err(_) => Response::error(StatusCode::SERVICE_UNAVAILABLE, "try again later"),
    }
}

// GET /logout
async fn logout(ctx: Context<User>) -> Response {
    ctx.logout();
    Response::text("bye")
}

// GET /project/new (registered before /project/:projectId)
async fn new_project(ctx: Context<User>) -> Response {
    if !ctx.is_logged_in() {
        return Response::error(StatusCode::UNAUTHORIZED, "log in first");
    }
    Response::text("new project form")
}

// GET /project/:projectId
async fn show_project(ctx: Context<User>) -> Response {
    let id = ctx.param("projectId").unwrap_or("?");
    let tab = ctx.query_param("tab").unwrap_or_else(|| "overview".to_owned());
    Response::text(format!("project {id}, tab {tab}"))
}

// GET /explode → translated by the failure handler above
async fn explode(_ctx: Context<User>) -> Response {
    panic!("the demo handler exploded")
}
