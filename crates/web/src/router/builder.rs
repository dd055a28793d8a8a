use std::sync::Arc;

use http::Method;

use crate::handler::RequestHandler;
use crate::router::{RouteError, Router};

/// Collects routes and mounts, then builds a [`Router`] in registration order.
///
/// ```
/// use http::Method;
/// use trellis_web::router::{get, Router};
/// use trellis_web::{handler_fn, Request};
///
/// async fn list(_request: Request) -> &'static str {
///     "articles"
/// }
///
/// async fn show(request: Request) -> String {
///     format!("article {}", request.param("id").unwrap_or("latest"))
/// }
///
/// let api = Router::builder().route("/", get(handler_fn(list)));
///
/// let router = Router::builder()
///     .route("/article/:id", get(handler_fn(show)).and(Method::POST).name("article"))
///     .mount("/api", api)
///     .build()
///     .unwrap();
///
/// assert_eq!(router.reverse("article", &[("id", "7")]), Some("/article/7".to_string()));
/// assert_eq!(router.reverse("api:list", &[]), Some("/api".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct RouterBuilder {
    routes: Vec<(String, RouteItem)>,
    mounts: Vec<(String, RouterBuilder)>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }
}

impl RouterBuilder {
    pub fn route(mut self, template: impl Into<String>, item: RouteItem) -> Self {
        self.routes.push((template.into(), item));
        self
    }

    /// Mounts the routes of `sub` below `prefix`.
    pub fn mount(mut self, prefix: impl Into<String>, sub: RouterBuilder) -> Self {
        self.mounts.push((prefix.into(), sub));
        self
    }

    /// Builds the router, registering routes before mounts.
    ///
    /// # Errors
    ///
    /// Returns the first [`RouteError`] of a registration or a mount.
    pub fn build(self) -> Result<Router, RouteError> {
        let mut router = Router::new();

        for (template, item) in self.routes {
            let name = item.name.as_deref();
            for method in item.methods {
                router.add_route(&template, method, Arc::clone(&item.handler), name)?;
            }
        }

        for (prefix, sub) in self.mounts {
            router.mount(&prefix, sub.build()?)?;
        }

        Ok(router)
    }
}

/// One handler registered for one or more methods.
pub struct RouteItem {
    methods: Vec<Method>,
    handler: Arc<dyn RequestHandler>,
    name: Option<String>,
}

impl std::fmt::Debug for RouteItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteItem")
            .field("methods", &self.methods)
            .field("handler", &self.handler.name())
            .field("name", &self.name)
            .finish()
    }
}

impl RouteItem {
    /// Also registers the handler for `method`.
    pub fn and(mut self, method: Method) -> Self {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    /// Registers the route for reverse lookup as `name` instead of the handler's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

macro_rules! method_route {
    ($method:ident, $constant:ident) => {
        #[doc = concat!("Registers a handler for `", stringify!($constant), "`.")]
        pub fn $method<H: RequestHandler + 'static>(handler: H) -> RouteItem {
            RouteItem { methods: vec![Method::$constant], handler: Arc::new(handler), name: None }
        }
    };
}

method_route!(get, GET);
method_route!(post, POST);
method_route!(put, PUT);
method_route!(delete, DELETE);
method_route!(head, HEAD);
method_route!(options, OPTIONS);
method_route!(connect, CONNECT);
method_route!(patch, PATCH);
method_route!(trace, TRACE);
