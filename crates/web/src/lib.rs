//! Routing for trellis-http
//!
//! This crate puts a trie router in front of the [`trellis_http`] connection core.
//! Routes are literal paths followed by parameters; every route has a name it can be
//! reversed by, and whole routers can be mounted below a path of another one.
//!
//! # Example
//!
//! ```no_run
//! use http::Method;
//! use trellis_web::router::{get, post, Router};
//! use trellis_web::{handler_fn, Request, Server};
//!
//! async fn index(_request: Request) -> &'static str {
//!     "Hello World!"
//! }
//!
//! async fn user(request: Request) -> String {
//!     format!("Hello {}!", request.param("name").unwrap_or("stranger"))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::builder()
//!         .route("/", get(handler_fn(index)))
//!         .route("/user/:name", get(handler_fn(user)).and(Method::POST))
//!         .build()
//!         .unwrap();
//!
//!     let server = Server::builder().router(router).address("127.0.0.1:8080").build().unwrap();
//!     server.start().await.unwrap();
//! }
//! ```
//!
//! # Routing rules
//!
//! - `/user/:name` matches `/user/ivan` and `/user`, where `name` is unbound
//! - a parameter can't be followed by a literal segment
//! - a node either captures parameters or has literal children, never both
//! - an unknown path is `404 Not Found`, a known path with another method
//!   `405 Method Not Allowed` with an `Allow` header

mod app;
mod handler;
mod request;
mod responder;
mod server;

pub mod router;

pub use app::App;
pub use handler::handler_fn;
pub use handler::BoxError;
pub use handler::FnHandler;
pub use handler::RequestHandler;
pub use request::PathParams;
pub use request::Request;
pub use responder::Responder;
pub use responder::StatusError;
pub use router::Router;
pub use server::Server;
pub use server::ServerBuilder;
pub use server::ServerError;
