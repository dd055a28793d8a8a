//! The per-request environ model.
//!
//! An [`Environ`] is built once per request, when the head has been parsed. It layers
//! three sources, looked up in this order:
//!
//! 1. the fixed request fields (`REQUEST_METHOD`, `REQUEST_URI`, `SERVER_PROTOCOL`,
//!    `SCRIPT_NAME`, `PATH_INFO`, `QUERY_STRING`)
//! 2. the request headers, keyed the CGI way (`HTTP_HOST`, `CONTENT_TYPE`, ...)
//! 3. the connection's immutable [`EnvironTemplate`] (`SERVER_NAME`, `REMOTE_ADDR`, ...)
//!
//! The template is shared behind an `Arc` and never mutated; values set on an environ
//! with [`Environ::insert`] shadow everything else.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, Version};

use crate::protocol::body::{BodyProgress, RequestBody};

/// Value of `SERVER_SOFTWARE` unless a template overrides it.
pub const SERVER_SOFTWARE: &str = concat!("trellis/", env!("CARGO_PKG_VERSION"));

/// Returns the wire name of an HTTP version, e.g. `HTTP/1.1`.
pub fn protocol_name(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.0",
    }
}

/// Per-connection defaults every [`Environ`] of that connection starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironTemplate {
    server_name: String,
    server_port: String,
    remote_addr: String,
    server_software: String,
    url_scheme: String,
    protocol: Version,
}

impl Default for EnvironTemplate {
    fn default() -> Self {
        Self::new("localhost", "80")
    }
}

impl EnvironTemplate {
    pub fn new(server_name: impl Into<String>, server_port: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            server_port: server_port.into(),
            remote_addr: String::new(),
            server_software: SERVER_SOFTWARE.to_string(),
            url_scheme: "http".to_string(),
            protocol: Version::HTTP_10,
        }
    }

    pub fn with_remote_addr(mut self, remote_addr: impl Into<String>) -> Self {
        self.remote_addr = remote_addr.into();
        self
    }

    pub fn with_server_software(mut self, server_software: impl Into<String>) -> Self {
        self.server_software = server_software.into();
        self
    }

    pub fn with_url_scheme(mut self, url_scheme: impl Into<String>) -> Self {
        self.url_scheme = url_scheme.into();
        self
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn server_port(&self) -> &str {
        &self.server_port
    }

    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    /// The protocol used to answer a request whose version is not known yet.
    pub fn protocol(&self) -> Version {
        self.protocol
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "SERVER_NAME" => Some(&self.server_name),
            "SERVER_PORT" => Some(&self.server_port),
            "REMOTE_ADDR" => Some(&self.remote_addr),
            "SERVER_SOFTWARE" => Some(&self.server_software),
            "URL_SCHEME" => Some(&self.url_scheme),
            "SERVER_PROTOCOL" => Some(protocol_name(self.protocol)),
            _ => None,
        }
    }
}

/// Everything the header parser extracts from the bytes before the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub(crate) method: Method,
    pub(crate) request_uri: String,
    pub(crate) protocol: Version,
    pub(crate) path_info: String,
    pub(crate) query_string: String,
    pub(crate) headers: HashMap<String, String>,
}

impl RequestHead {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn protocol(&self) -> Version {
        self.protocol
    }

    /// The percent-decoded path, with encoded slashes kept as `%2F`.
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Looks a header up by its CGI key, e.g. `HTTP_HOST` or `CONTENT_TYPE`.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn expects_continue(&self) -> bool {
        self.header("HTTP_EXPECT").is_some_and(|value| value.eq_ignore_ascii_case("100-continue"))
    }
}

/// The mapping of all per-request metadata handed to a handler, plus the body handle.
#[derive(Debug)]
pub struct Environ {
    template: Arc<EnvironTemplate>,
    head: RequestHead,
    script_name: String,
    extra: HashMap<String, String>,
    body: RequestBody,
}

impl Environ {
    pub fn new(template: Arc<EnvironTemplate>, head: RequestHead, body: RequestBody) -> Self {
        Self { template, head, script_name: String::new(), extra: HashMap::new(), body }
    }

    pub fn method(&self) -> &Method {
        &self.head.method
    }

    pub fn request_uri(&self) -> &str {
        &self.head.request_uri
    }

    pub fn protocol(&self) -> Version {
        self.head.protocol
    }

    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    pub fn set_script_name(&mut self, script_name: impl Into<String>) {
        self.script_name = script_name.into();
    }

    pub fn path_info(&self) -> &str {
        &self.head.path_info
    }

    pub fn query_string(&self) -> &str {
        &self.head.query_string
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn template(&self) -> &EnvironTemplate {
        &self.template
    }

    /// Looks a request header up by its CGI key, e.g. `HTTP_HOST` or `CONTENT_TYPE`.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.head.header(key)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("CONTENT_TYPE")
    }

    /// The announced body length; `None` when absent or not a number.
    pub fn content_length(&self) -> Option<u64> {
        self.header("CONTENT_LENGTH").and_then(|value| value.trim().parse().ok())
    }

    /// Looks any environ key up: fixed fields, then inserted values, then headers, then
    /// the connection template.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "REQUEST_METHOD" => Some(self.head.method.as_str()),
            "REQUEST_URI" => Some(&self.head.request_uri),
            "SERVER_PROTOCOL" => Some(protocol_name(self.head.protocol)),
            "SCRIPT_NAME" => Some(&self.script_name),
            "PATH_INFO" => Some(&self.head.path_info),
            "QUERY_STRING" => Some(&self.head.query_string),
            _ => self
                .extra
                .get(key)
                .or_else(|| self.head.headers.get(key))
                .map(String::as_str)
                .or_else(|| self.template.get(key)),
        }
    }

    /// Stores an application level value; it shadows headers and template fields.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.extra.insert(key.into(), value.into())
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut RequestBody {
        &mut self.body
    }

    pub fn is_body_complete(&self) -> bool {
        self.body.is_complete()
    }

    pub fn body_progress(&self) -> BodyProgress {
        self.body.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_head;
    use bytes::Bytes;
    use indoc::indoc;

    fn environ(raw: &str) -> Environ {
        let head = parse_head(raw.replace('\n', "\r\n").as_bytes()).unwrap();
        let template = EnvironTemplate::new("myhost", "8080").with_remote_addr("athost");
        Environ::new(Arc::new(template), head, RequestBody::empty())
    }

    #[test]
    fn layered_lookup() {
        let mut environ = environ(indoc! {r##"
        GET /wiki/article?last=Y HTTP/1.1
        Host: ru.wikipedia.org
        Content-Type: text/plain

        "##});

        assert_eq!(environ.get("REQUEST_METHOD"), Some("GET"));
        assert_eq!(environ.get("SERVER_PROTOCOL"), Some("HTTP/1.1"));
        assert_eq!(environ.get("PATH_INFO"), Some("/wiki/article"));
        assert_eq!(environ.get("QUERY_STRING"), Some("last=Y"));
        assert_eq!(environ.get("SCRIPT_NAME"), Some(""));
        assert_eq!(environ.get("HTTP_HOST"), Some("ru.wikipedia.org"));
        assert_eq!(environ.get("CONTENT_TYPE"), Some("text/plain"));
        assert_eq!(environ.get("SERVER_NAME"), Some("myhost"));
        assert_eq!(environ.get("SERVER_PORT"), Some("8080"));
        assert_eq!(environ.get("REMOTE_ADDR"), Some("athost"));
        assert_eq!(environ.get("SERVER_SOFTWARE"), Some(SERVER_SOFTWARE));
        assert_eq!(environ.get("HTTP_MISSING"), None);

        environ.insert("SERVER_NAME", "override");
        assert_eq!(environ.get("SERVER_NAME"), Some("override"));
        assert_eq!(environ.template().server_name(), "myhost");
    }

    #[test]
    fn body_flags() {
        let environ = environ("GET / HTTP/1.0\n\n");
        assert!(environ.is_body_complete());
        assert_eq!(environ.content_length(), None);

        let head = parse_head(b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\n").unwrap();
        let environ = Environ::new(Arc::new(EnvironTemplate::default()), head, RequestBody::complete(Bytes::from_static(b"abc")));
        assert_eq!(environ.content_length(), Some(3));
        assert!(environ.is_body_complete());
        assert_eq!(environ.body_progress().received, 3);
    }

    #[test]
    fn protocol_names() {
        assert_eq!(protocol_name(Version::HTTP_10), "HTTP/1.0");
        assert_eq!(protocol_name(Version::HTTP_11), "HTTP/1.1");
        assert_eq!(EnvironTemplate::default().get("SERVER_PROTOCOL"), Some("HTTP/1.0"));
    }
}
