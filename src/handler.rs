//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The route table holds handlers of *different* types in one `Vec`. Rust
//! collections can only hold one concrete type, so each handler is hidden
//! behind a trait object (`dyn ErasedHandler<P>`) and stored uniformly.
//!
//! ```text
//! async fn show(ctx: Context<User>) -> Response { … }   ← user writes this
//!        ↓ router.route("/project/:id", show)?
//! show.into_boxed_handler()                           ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(show))                           ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler<User> = Arc<dyn ErasedHandler<User>>
//! handler.call(ctx)  at request time                  ← one vtable dispatch
//!        ↓
//! Box::pin(async { show(ctx).await.into_response() })
//! ```
//!
//! Per request that costs one `Arc` clone and one virtual call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler<P> {
    fn call(&self, ctx: Context<P>) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler<P> = Arc<dyn ErasedHandler<P> + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure with the shape:
///
/// ```text
/// async fn name(ctx: Context<P>) -> impl IntoResponse
/// ```
///
/// `P` is the principal type of the router's [`SessionStore`](crate::SessionStore).
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler<P>: private::Sealed<P> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler<P>;
}

mod private {
    pub trait Sealed<P> {}
}

impl<F, Fut, R, P> private::Sealed<P> for F
where
    F: Fn(Context<P>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R, P> Handler<P> for F
where
    F: Fn(Context<P>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
    // `BoxedHandler<P>` is a `dyn ... + 'static` object, which may only
    // name a `'static` principal type.
    P: 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<P> {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R, P> ErasedHandler<P> for FnHandler<F>
where
    F: Fn(Context<P>) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, ctx: Context<P>) -> BoxFuture {
        let fut = (self.0)(ctx);
        Box::pin(async move { fut.await.into_response() })
    }
}
