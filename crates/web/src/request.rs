//! What a routed handler receives: the environ of the request and the captured path
//! parameters.

use bytes::Bytes;
use http::{Method, Version};
use trellis_http::protocol::body::BodyProgress;
use trellis_http::protocol::{BodyError, Environ};

/// A request dispatched to a [`RequestHandler`](crate::RequestHandler).
#[derive(Debug)]
pub struct Request {
    environ: Environ,
    params: PathParams,
}

impl Request {
    pub fn new(environ: Environ, params: PathParams) -> Self {
        Self { environ, params }
    }

    pub fn environ(&self) -> &Environ {
        &self.environ
    }

    pub fn environ_mut(&mut self) -> &mut Environ {
        &mut self.environ
    }

    pub fn into_environ(self) -> Environ {
        self.environ
    }

    pub fn method(&self) -> &Method {
        self.environ.method()
    }

    pub fn protocol(&self) -> Version {
        self.environ.protocol()
    }

    pub fn path_info(&self) -> &str {
        self.environ.path_info()
    }

    pub fn query_string(&self) -> &str {
        self.environ.query_string()
    }

    /// Looks a header up by its CGI key, e.g. `HTTP_HOST`.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.environ.header(key)
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// The value bound to the path parameter `name`, if any.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn body_progress(&self) -> BodyProgress {
        self.environ.body_progress()
    }

    /// Waits until the whole body has arrived.
    pub async fn body(&mut self) -> Result<Bytes, BodyError> {
        self.environ.body_mut().finish_reading().await
    }
}

/// Path parameters captured by a route, in template order.
///
/// Trailing parameters the path had no segments for are present but unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, Option<String>)>,
}

impl PathParams {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Binds `segments` to `names` by position; names left over stay unbound.
    pub(crate) fn bind(names: &[String], segments: &[&str]) -> Self {
        let params = names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), segments.get(index).map(|segment| segment.to_string())))
            .collect();
        Self { params }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `None` both for unknown and for unbound parameters.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(key, _)| key == name).and_then(|(_, value)| value.as_deref())
    }

    /// Whether the route has a parameter called `name`, bound or not.
    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|(key, _)| key == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.params.iter().map(|(key, value)| (key.as_str(), value.as_deref()))
    }
}

#[cfg(test)]
pub(crate) fn test_environ(head: &str) -> Environ {
    use std::sync::Arc;
    use trellis_http::codec::parse_head;
    use trellis_http::protocol::body::RequestBody;
    use trellis_http::protocol::EnvironTemplate;

    let head = parse_head(head.as_bytes()).unwrap();
    Environ::new(Arc::new(EnvironTemplate::default()), head, RequestBody::empty())
}
