use http::{Method, StatusCode};
use serde_json::json;
use trellis_web::router::{get, post, Router};
use trellis_web::{handler_fn, BoxError, Request, Server, StatusError};

async fn hello_world(_request: Request) -> &'static str {
    "Hello World!\r\n"
}

async fn user(request: Request) -> String {
    match request.param("name") {
        Some(name) => format!("Hello {name}!\r\n"),
        None => "Who are you?\r\n".to_string(),
    }
}

async fn upload(mut request: Request) -> Result<(StatusCode, serde_json::Value), BoxError> {
    let body = request.body().await?;
    Ok((StatusCode::CREATED, json!({ "received": body.len() })))
}

async fn article(request: Request) -> Result<serde_json::Value, StatusError> {
    let id = request.param("id").ok_or_else(StatusError::not_found)?;
    Ok(json!({ "id": id, "title": format!("article {id}") }))
}

#[tokio::main]
async fn main() {
    let api = Router::builder()
        .route("/", get(handler_fn(hello_world)).name("index"))
        .route("/article/:id", get(handler_fn(article)));

    let router = Router::builder()
        .route("/", get(handler_fn(hello_world)).and(Method::HEAD))
        .route("/user/:name", get(handler_fn(user)).and(Method::POST))
        .route("/upload", post(handler_fn(upload)))
        .mount("/api/v1", api)
        .build()
        .expect("routes are valid");

    let server = Server::builder().router(router).address("127.0.0.1:8080").build().expect("server config is valid");

    let app = server.app();
    println!("user page: {:?}", app.url_for("user", &[("name", "ivan")]));
    println!("api article: {:?}", app.url_for("api:v1:article", &[("id", "7")]));

    if let Err(e) = server.start().await {
        eprintln!("server stopped: {e}");
    }
}
