//! The dispatch contract between a connection and the application.
//!
//! A [`Handler`] receives the [`Environ`] of a request and answers with a [`Response`].
//! Failures are logged by the connection and answered with `500 Internal Server Error`.

use std::error::Error;
use std::future::Future;

use async_trait::async_trait;

use crate::protocol::{Environ, Response};

#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>> + Send;

    async fn call(&self, environ: Environ) -> Result<Response, Self::Error>;
}

/// A [`Handler`] made from an async function, see [`make_handler`].
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<Err, F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Environ) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>> + Send,
    Fut: Future<Output = Result<Response, Err>> + Send,
{
    type Error = Err;

    async fn call(&self, environ: Environ) -> Result<Response, Self::Error> {
        (self.f)(environ).await
    }
}

pub fn make_handler<F, Err, Ret>(f: F) -> HandlerFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Ret: Future<Output = Result<Response, Err>>,
    F: Fn(Environ) -> Ret,
{
    HandlerFn { f }
}
