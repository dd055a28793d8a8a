use std::any::type_name;
use std::error::Error;
use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use trellis_http::protocol::Response;

use crate::responder::Responder;
use crate::Request;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// A routed endpoint.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// The name routes to this handler are registered under unless they are given one.
    fn name(&self) -> &str;

    async fn invoke(&self, request: Request) -> Result<Response, BoxError>;
}

/// An async fn taking a [`Request`] and returning any [`Responder`].
pub struct FnHandler<F, Fut> {
    f: F,
    name: &'static str,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> std::fmt::Debug for FnHandler<F, Fut> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish()
    }
}

impl<F, Fut> FnHandler<F, Fut>
where
    F: Fn(Request) -> Fut,
    Fut: Future,
{
    fn new(f: F) -> Self {
        Self { f, name: short_type_name::<F>(), _phantom: PhantomData }
    }
}

/// Wraps an async fn into a [`RequestHandler`] named after the fn.
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F, Fut>
where
    F: Fn(Request) -> Fut,
    Fut: Future,
{
    FnHandler::new(f)
}

/// The last path segment of a type name: `app::views::index` becomes `index`.
fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F, Fut>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder + Send,
{
    fn name(&self) -> &str {
        self.name
    }

    async fn invoke(&self, request: Request) -> Result<Response, BoxError> {
        (self.f)(request).await.into_response()
    }
}
