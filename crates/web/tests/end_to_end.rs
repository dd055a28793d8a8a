use std::net::SocketAddr;

use http::{Method, StatusCode};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use trellis_web::router::{get, post, Router};
use trellis_web::{handler_fn, BoxError, Request, Server};

async fn index(_request: Request) -> &'static str {
    "index"
}

async fn user(request: Request) -> String {
    format!("user {}", request.param("name").unwrap_or("-"))
}

async fn new_article(mut request: Request) -> Result<(StatusCode, serde_json::Value), BoxError> {
    let body = request.body().await?;
    Ok((StatusCode::CREATED, json!({ "id": request.param("id"), "size": body.len() })))
}

async fn environ(request: Request) -> String {
    let environ = request.environ();
    format!(
        "{} {} {}",
        environ.get("SERVER_NAME").unwrap_or_default(),
        environ.get("REMOTE_ADDR").unwrap_or_default(),
        environ.get("HTTP_X_TRACE").unwrap_or_default()
    )
}

fn router() -> Router {
    let api = Router::builder()
        .route("/", get(handler_fn(index)).name("root"))
        .route("/user/:name", get(handler_fn(user)));

    Router::builder()
        .route("/", get(handler_fn(index)))
        .route("/user/:name", get(handler_fn(user)).and(Method::POST))
        .route("/article/new/:id", post(handler_fn(new_article)))
        .route("/environ", get(handler_fn(environ)))
        .mount("/api", api)
        .build()
        .unwrap()
}

async fn start() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let server = Server::builder().router(router()).address(address).server_name("testhost").build().unwrap();
    tokio::spawn(server.serve(listener));
    address
}

struct RawResponse {
    status_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RawResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    fn text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap()
    }
}

async fn read_response(stream: &mut TcpStream) -> RawResponse {
    let mut buf = Vec::new();
    let head_end = loop {
        if let Some(index) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
            break index;
        }
        let mut chunk = [0u8; 1024];
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the response head");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap().to_string();
    let headers: Vec<(String, String)> = lines
        .map(|line| {
            let (name, value) = line.split_once(": ").unwrap();
            (name.to_string(), value.to_string())
        })
        .collect();

    let mut body = buf[head_end + 4..].to_vec();
    let length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
        .map(|(_, value)| value.parse::<usize>().unwrap())
        .unwrap_or(0);
    while body.len() < length {
        let mut chunk = [0u8; 1024];
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the response body");
        body.extend_from_slice(&chunk[..n]);
    }

    RawResponse { status_line, headers, body }
}

async fn assert_closed(stream: &mut TcpStream) {
    let mut rest = Vec::new();
    stream.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}

#[tokio::test]
async fn keep_alive_across_routes() {
    let address = start().await;
    let mut stream = TcpStream::connect(address).await.unwrap();

    stream.write_all(b"GET / HTTP/1.1\r\nHost: test\r\n\r\n").await.unwrap();
    let response = read_response(&mut stream).await;
    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.text(), "index");

    stream.write_all(b"GET /user/ivan HTTP/1.1\r\nHost: test\r\n\r\n").await.unwrap();
    assert_eq!(read_response(&mut stream).await.text(), "user ivan");

    stream.write_all(b"POST /user HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n").await.unwrap();
    assert_eq!(read_response(&mut stream).await.text(), "user -");
    assert_closed(&mut stream).await;
}

#[tokio::test]
async fn body_reaches_the_handler() {
    let address = start().await;
    let mut stream = TcpStream::connect(address).await.unwrap();

    stream.write_all(b"POST /article/new/007 HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello").await.unwrap();
    tokio::task::yield_now().await;
    stream.write_all(b" world").await.unwrap();

    let response = read_response(&mut stream).await;
    assert_eq!(response.status_line, "HTTP/1.1 201 Created");
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(value, json!({ "id": "007", "size": 11 }));
}

#[tokio::test]
async fn unknown_paths_and_methods() {
    let address = start().await;

    let mut stream = TcpStream::connect(address).await.unwrap();
    stream.write_all(b"GET /article/new HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut stream).await;
    assert_eq!(response.status_line, "HTTP/1.1 405 Method Not Allowed");
    assert_eq!(response.header("Allow"), Some("POST"));
    assert_closed(&mut stream).await;

    let mut stream = TcpStream::connect(address).await.unwrap();
    stream.write_all(b"GET /user/ivan/0/0 HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(read_response(&mut stream).await.status_line, "HTTP/1.1 404 Not Found");
    assert_closed(&mut stream).await;
}

#[tokio::test]
async fn mounted_router() {
    let address = start().await;
    let mut stream = TcpStream::connect(address).await.unwrap();

    stream.write_all(b"GET /api HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(read_response(&mut stream).await.text(), "index");

    stream.write_all(b"GET /api/user/bob HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(read_response(&mut stream).await.text(), "user bob");
}

#[tokio::test]
async fn environ_carries_connection_defaults() {
    let address = start().await;
    let mut stream = TcpStream::connect(address).await.unwrap();

    stream.write_all(b"GET /environ HTTP/1.0\r\nX-Trace: abc\r\n\r\n").await.unwrap();
    let response = read_response(&mut stream).await;
    assert_eq!(response.status_line, "HTTP/1.0 200 OK");
    assert_eq!(response.text(), "testhost 127.0.0.1 abc");
    assert_closed(&mut stream).await;
}

#[test]
fn reverse_then_resolve() {
    let router = router();

    for (name, args, path) in [
        ("index", vec![], "/"),
        ("user", vec![("name", "ivan")], "/user/ivan"),
        ("user", vec![], "/user"),
        ("new_article", vec![("id", "42")], "/article/new/42"),
        ("api:root", vec![], "/api"),
        ("api:user", vec![("name", "bob")], "/api/user/bob"),
    ] {
        let url = router.reverse(name, &args).unwrap();
        assert_eq!(url, path);

        let method = if name == "new_article" { Method::POST } else { Method::GET };
        let trellis_web::router::Resolution::Matched { params, .. } = router.resolve(&url, &method) else {
            panic!("{url} does not resolve");
        };
        for (key, value) in args {
            assert_eq!(params.get(key), Some(value));
        }
    }
}

async fn scenario_index(_request: Request) -> &'static str {
    "Index"
}

async fn scenario_user(request: Request) -> serde_json::Value {
    json!({ "name": request.param("name") })
}

#[tokio::test]
async fn index_and_user_scenario() {
    let router = Router::builder()
        .route("/", get(handler_fn(scenario_index)))
        .route("/user/:name", get(handler_fn(scenario_user)).and(Method::POST))
        .build()
        .unwrap();

    let trellis_web::router::Resolution::Matched { params, .. } = router.resolve("/user", &Method::GET) else {
        panic!("/user does not resolve");
    };
    assert!(params.contains("name"));
    assert_eq!(params.get("name"), None);
    assert!(matches!(
        router.resolve("/", &Method::POST),
        trellis_web::router::Resolution::MethodNotAllowed(allowed) if allowed == [Method::GET]
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(Server::builder().router(router).address(address).build().unwrap().serve(listener));
    let mut stream = TcpStream::connect(address).await.unwrap();

    stream.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(read_response(&mut stream).await.text(), "Index");

    stream.write_all(b"GET /user HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(read_response(&mut stream).await.text(), r#"{"name":null}"#);

    stream.write_all(b"POST /user/ivan HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(read_response(&mut stream).await.text(), r#"{"name":"ivan"}"#);

    stream.write_all(b"POST / HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut stream).await;
    assert_eq!(response.status_line, "HTTP/1.1 405 Method Not Allowed");
    assert_eq!(response.header("Allow"), Some("GET"));
    assert_closed(&mut stream).await;
}
