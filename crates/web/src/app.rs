use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use trellis_http::handler::Handler;
use trellis_http::protocol::{Environ, Response};

use crate::handler::{BoxError, RequestHandler};
use crate::responder::{Responder, StatusError};
use crate::router::{Resolution, Router};
use crate::Request;

/// Dispatches every request of a connection through a [`Router`].
///
/// Unknown paths are answered with `404 Not Found`; known paths without the request
/// method with `405 Method Not Allowed` and an `Allow` header.
#[derive(Debug, Clone)]
pub struct App {
    router: Arc<Router>,
}

impl App {
    pub fn new(router: Router) -> Self {
        Self { router: Arc::new(router) }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Builds the URL of the route registered as `name`.
    pub fn url_for(&self, name: &str, args: &[(&str, &str)]) -> Option<String> {
        self.router.reverse(name, args)
    }
}

#[async_trait]
impl Handler for App {
    type Error = BoxError;

    async fn call(&self, environ: Environ) -> Result<Response, Self::Error> {
        let resolution = self.router.resolve(environ.path_info(), environ.method());

        match resolution {
            Resolution::Matched { endpoint, params } => {
                let handler: Arc<dyn RequestHandler> = Arc::clone(endpoint);
                debug!(path = environ.path_info(), handler = handler.name(), "route matched");
                handler.invoke(Request::new(environ, params)).await
            }
            Resolution::MethodNotAllowed(allowed) => {
                debug!(path = environ.path_info(), method = %environ.method(), "method not allowed");
                StatusError::method_not_allowed(&allowed).into_response()
            }
            Resolution::NotFound => {
                debug!(path = environ.path_info(), "no route");
                StatusError::not_found().into_response()
            }
        }
    }
}
