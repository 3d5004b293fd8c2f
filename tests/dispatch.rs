use std::any::Any;

use bytes::Bytes;
use waymark::{Context, Response, Router, SessionConfig, SessionStore, StatusCode, panic_message};

#[derive(Debug, Clone, PartialEq)]
struct User {
    name: String,
}

fn get(path: &str) -> http::Request<Bytes> {
    http::Request::builder().uri(path).body(Bytes::new()).unwrap()
}

fn get_with_sid(path: &str, sid: &str) -> http::Request<Bytes> {
    http::Request::builder()
        .uri(path)
        .header("cookie", format!("theme=dark; SID={sid}"))
        .body(Bytes::new())
        .unwrap()
}

/// Value of the `SID` cookie set by `response`, if any.
fn set_sid(response: &Response) -> Option<String> {
    response
        .headers()
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("set-cookie"))
        .filter_map(|(_, v)| cookie::Cookie::parse(v.clone()).ok())
        .find(|c| c.name() == "SID")
        .map(|c| c.value().to_owned())
}

async fn whoami(ctx: Context<User>) -> Response {
    match ctx.session().principal() {
        Some(user) => Response::text(user.name.clone()),
        None => Response::text("anonymous"),
    }
}

async fn login(ctx: Context<User>) -> Response {
    let name = ctx.param("name").unwrap_or_default().to_owned();
    match ctx.login(User { name }) {
        Ok(_) => Response::status(StatusCode::NO_CONTENT),
        Err(_) => Response::status(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn logout(ctx: Context<User>) -> Response {
    ctx.logout();
    Response::status(StatusCode::NO_CONTENT)
}

async fn renew(ctx: Context<User>) -> Response {
    ctx.renew_cookie();
    Response::status(StatusCode::NO_CONTENT)
}

async fn project(ctx: Context<User>) -> String {
    format!("project={}", ctx.param("projectId").unwrap_or("?"))
}

async fn boom(_: Context<User>) -> Response {
    panic!("forbidden: not your project")
}

async fn login_then_boom(ctx: Context<User>) -> Response {
    let _ = ctx.login(User { name: "mallory".into() });
    panic!("after login")
}

async fn login_with_bad_header(ctx: Context<User>) -> Response {
    let _ = ctx.login(User { name: "erin".into() });
    Response::builder().header("x-note", "line\nbreak").text("hi")
}

async fn login_twice(ctx: Context<User>) -> Response {
    let _ = ctx.login(User { name: "first".into() });
    let _ = ctx.login(User { name: "second".into() });
    Response::status(StatusCode::NO_CONTENT)
}

async fn login_then_logout(ctx: Context<User>) -> Response {
    let _ = ctx.login(User { name: "brief".into() });
    ctx.logout();
    Response::status(StatusCode::NO_CONTENT)
}

/// Every `SID` value set by `response`.
fn all_sids(response: &Response) -> Vec<String> {
    response
        .headers()
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("set-cookie"))
        .filter_map(|(_, v)| cookie::Cookie::parse(v.clone()).ok())
        .filter(|c| c.name() == "SID")
        .map(|c| c.value().to_owned())
        .collect()
}

fn app() -> Router<User> {
    Router::new()
        .route("/", whoami).unwrap()
        .route("/login/:name", login).unwrap()
        .route("/logout", logout).unwrap()
        .route("/renew", renew).unwrap()
        .route("/project/:projectId", project).unwrap()
        .route("/boom", boom).unwrap()
        .route("/login-then-boom", login_then_boom).unwrap()
        .route("/login-bad-header", login_with_bad_header).unwrap()
        .route("/login-twice", login_twice).unwrap()
        .route("/login-then-logout", login_then_logout).unwrap()
}

#[tokio::test]
async fn unmatched_path_is_404() {
    let res = app().handle(get("/nowhere/at/all")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(res.body(), b"Not Found\n");
}

#[tokio::test]
async fn path_params_reach_the_handler() {
    let res = app().handle(get("/project/42")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"project=42");
}

#[tokio::test]
async fn query_string_does_not_affect_routing() {
    let res = app().handle(get("/project/42?tab=files")).await;
    assert_eq!(res.body(), b"project=42");
}

#[tokio::test]
async fn login_sets_cookie_and_later_requests_see_principal() {
    let app = app();

    let res = app.handle(get("/login/alice")).await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    let sid = set_sid(&res).expect("login sets SID");
    assert_eq!(sid.len(), 43);

    let res = app.handle(get_with_sid("/", &sid)).await;
    assert_eq!(res.body(), b"alice");
    assert_eq!(
        app.session_store().lookup(&sid).principal(),
        Some(&User { name: "alice".into() })
    );
}

#[tokio::test]
async fn logout_clears_session_and_cookie() {
    let app = app();
    let sid = set_sid(&app.handle(get("/login/bob")).await).unwrap();

    let res = app.handle(get_with_sid("/logout", &sid)).await;
    assert_eq!(set_sid(&res).as_deref(), Some(""));
    let set_cookie = res.header("set-cookie").unwrap();
    assert!(set_cookie.contains("Max-Age=0"));

    let res = app.handle(get_with_sid("/", &sid)).await;
    assert_eq!(res.body(), b"anonymous");
    assert!(app.session_store().is_empty());

    // Second logout with the stale cookie is harmless.
    let res = app.handle(get_with_sid("/logout", &sid)).await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn logout_without_cookie_sets_nothing() {
    let res = app().handle(get("/logout")).await;
    assert!(res.header("set-cookie").is_none());
}

#[tokio::test]
async fn relogin_replaces_previous_session() {
    let app = app();
    let first = set_sid(&app.handle(get("/login/alice")).await).unwrap();
    let second = set_sid(&app.handle(get_with_sid("/login/alice2", &first)).await).unwrap();

    assert_ne!(first, second);
    assert!(!app.session_store().lookup(&first).is_logged_in());
    assert!(app.session_store().lookup(&second).is_logged_in());
    assert_eq!(app.session_store().len(), 1);
}

#[tokio::test]
async fn renew_reissues_only_live_sessions() {
    let app = app();
    let sid = set_sid(&app.handle(get("/login/dave")).await).unwrap();

    let res = app.handle(get_with_sid("/renew", &sid)).await;
    assert_eq!(set_sid(&res), Some(sid));

    let res = app.handle(get_with_sid("/renew", "stale")).await;
    assert!(res.header("set-cookie").is_none());
}

#[tokio::test]
async fn unknown_sid_is_anonymous() {
    let res = app().handle(get_with_sid("/", "forged-or-stale")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"anonymous");
}

#[tokio::test]
async fn panic_without_failure_handler_is_generic_500() {
    let res = app().handle(get("/boom")).await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body(), b"Internal server error\n");
}

#[tokio::test]
async fn panic_is_translated_by_failure_handler() {
    let app = app().on_failure(|payload: &(dyn Any + Send)| match panic_message(payload) {
        Some(msg) if msg.starts_with("forbidden") => (StatusCode::FORBIDDEN, msg.to_owned()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "oops".to_owned()),
    });

    let res = app.handle(get("/boom")).await;
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(res.body(), b"forbidden: not your project\n");

    // The router keeps serving after a panic.
    let res = app.handle(get("/project/1")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn panicking_failure_handler_falls_back_to_500() {
    let app = app().on_failure(|_: &(dyn Any + Send)| -> (StatusCode, String) {
        panic!("translator is broken too")
    });
    let res = app.handle(get("/boom")).await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn cookies_queued_before_a_panic_are_still_sent() {
    let app = app();
    let res = app.handle(get("/login-then-boom")).await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let sid = set_sid(&res).expect("session cookie survives the panic");
    assert!(app.session_store().lookup(&sid).is_logged_in());
}

#[tokio::test]
async fn invalid_handler_header_keeps_session_cookie() {
    let app = app();
    let res = app.handle(get("/login-bad-header")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.header("x-note"), None);

    let sid = set_sid(&res).expect("session cookie survives the bad header");
    assert!(app.session_store().lookup(&sid).is_logged_in());
}

#[tokio::test]
async fn repeated_login_in_one_request_keeps_only_the_last_session() {
    let app = app();
    let res = app.handle(get("/login-twice")).await;

    let sids = all_sids(&res);
    assert_eq!(sids.len(), 1);
    assert_eq!(app.session_store().len(), 1);
    assert_eq!(
        app.session_store().lookup(&sids[0]).principal(),
        Some(&User { name: "second".into() })
    );
}

#[tokio::test]
async fn logout_after_login_in_one_request_leaves_nothing_behind() {
    let app = app();
    let res = app.handle(get("/login-then-logout")).await;

    assert_eq!(all_sids(&res), vec![String::new()]);
    assert!(app.session_store().is_empty());
}

#[tokio::test]
async fn injected_store_is_shared_and_cookie_name_configurable() {
    let store: SessionStore<User> = SessionStore::with_config(SessionConfig::new().cookie_name("app_sid"));
    let sid = store.init(User { name: "carol".into() }).unwrap();

    let app = app().sessions(store.clone());
    let req = http::Request::builder()
        .uri("/")
        .header("cookie", format!("app_sid={sid}"))
        .body(Bytes::new())
        .unwrap();
    assert_eq!(app.handle(req).await.body(), b"carol");

    // The default cookie name is no longer consulted.
    assert_eq!(app.handle(get_with_sid("/", &sid)).await.body(), b"anonymous");
}

#[tokio::test]
async fn context_exposes_request_details() {
    async fn echo(ctx: Context) -> Response {
        Response::text(format!(
            "{} {} q={} h={} body={}",
            ctx.method(),
            ctx.path(),
            ctx.query_param("q").unwrap_or_default(),
            ctx.header("X-Trace").unwrap_or("-"),
            String::from_utf8_lossy(ctx.body()),
        ))
    }

    let app = Router::new().route("/echo/:x", echo).unwrap();
    let req = http::Request::builder()
        .method("POST")
        .uri("/echo/a%20b?q=hello+world&q=second")
        .header("x-trace", "t-1")
        .body(Bytes::from_static(b"payload"))
        .unwrap();

    let res = app.handle(req).await;
    assert_eq!(res.body(), b"POST /echo/a%20b q=hello world h=t-1 body=payload");
}
