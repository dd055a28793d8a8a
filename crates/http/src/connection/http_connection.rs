use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::BytesMut;
use futures::FutureExt;
use http::{StatusCode, Version};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::select;
use tokio_util::codec::Decoder;
use tracing::{debug, error, info, trace, warn};

use crate::codec::RequestDecoder;
use crate::connection::ConnectionConfig;
use crate::connection::message_writer::MessageWriter;
use crate::connection::timeout::Timeout;
use crate::handler::Handler;
use crate::protocol::body::{BodySender, RequestBody, body_channel};
use crate::protocol::{
    Environ, EnvironTemplate, HttpError, Message, ParseError, PayloadItem, PayloadSize, RequestHead, Response,
};

/// The phases a connection goes through.
///
/// `AwaitingFirstBytes → ReadingHeaders → (ReadingBody)? → Dispatched → WritingResponse →
/// (IdleKeepAlive → ReadingHeaders | Closed)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingFirstBytes,
    ReadingHeaders,
    ReadingBody,
    Dispatched,
    WritingResponse,
    IdleKeepAlive,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An HTTP/1.x connection serving sequential requests until it is closed.
///
/// `HttpConnection` handles the full lifecycle of a connection:
/// - Reading and decoding request heads, with one deadline per phase
/// - Streaming request bodies to a handler that already runs
/// - Handling the expect-continue mechanism
/// - Writing responses and deciding between keep-alive and close
///
/// Exactly one request is in flight at a time, pipelined requests are not supported.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: R,
    read_buf: BytesMut,
    decoder: RequestDecoder,
    writer: MessageWriter<W>,
    template: Arc<EnvironTemplate>,
    config: ConnectionConfig,
    timeout: Timeout,
    state: ConnectionState,
}

enum ReadHead {
    Head(RequestHead, PayloadSize),
    Invalid(ParseError),
    TimedOut,
    PeerClosed,
}

enum Outcome {
    Handled(Result<Response, Box<dyn Error + Send + Sync>>),
    TimedOut,
    PeerClosed,
    Failed(HttpError),
}

/// What the close decision needs to know about the request being answered.
struct CurrentRequest {
    protocol: Version,
    connection: Option<String>,
    force_close: bool,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, template: Arc<EnvironTemplate>, config: ConnectionConfig) -> Self {
        Self {
            reader,
            read_buf: BytesMut::with_capacity(config.read_buffer_capacity()),
            decoder: RequestDecoder::new(),
            writer: MessageWriter::with_capacity(writer, config.read_buffer_capacity()),
            template,
            config,
            timeout: Timeout::default(),
            state: ConnectionState::AwaitingFirstBytes,
        }
    }

    /// Serves requests with `handler` until the connection is closed.
    ///
    /// Protocol errors and timeouts are answered and end the connection normally, only
    /// transport failures are returned as errors.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        self.timeout.arm(self.config.first_request_timeout());
        let result = self.serve(handler.as_ref()).await;
        self.close().await;
        result
    }

    async fn serve<H: Handler>(&mut self, handler: &H) -> Result<(), HttpError> {
        loop {
            if !self.await_request().await? {
                return Ok(());
            }

            if !self.serve_request(handler).await? {
                return Ok(());
            }

            // the next request starts from a clean slate, stray bytes included
            self.read_buf.clear();
            self.decoder.reset();
            self.timeout.arm(self.config.keepalive_timeout());
            self.transition(ConnectionState::IdleKeepAlive);
        }
    }

    /// Waits for the first bytes of the next request, false when there will be none.
    async fn await_request(&mut self) -> Result<bool, HttpError> {
        let read = select! {
            result = self.reader.read_buf(&mut self.read_buf) => result.map_err(ParseError::io)?,
            () = self.timeout.expired() => {
                info!(state = %self.state, timeout = ?self.timeout.duration(), "idle connection timed out");
                return Ok(false);
            }
        };

        if read == 0 {
            debug!(state = %self.state, "peer closed the connection");
            return Ok(false);
        }

        trace!(size = read, "received first bytes of a request");
        self.timeout.arm(self.config.request_timeout());
        self.transition(ConnectionState::ReadingHeaders);
        Ok(true)
    }

    /// Serves one request, returns whether the connection stays open.
    async fn serve_request<H: Handler>(&mut self, handler: &H) -> Result<bool, HttpError> {
        let (head, payload_size) = match self.read_head().await? {
            ReadHead::Head(head, payload_size) => (head, payload_size),
            ReadHead::Invalid(e) => {
                warn!(cause = %e, "can't parse request head");
                self.respond_error(e.status_code(), self.template.protocol()).await?;
                return Ok(false);
            }
            ReadHead::TimedOut => {
                info!("request head timed out");
                self.respond_error(StatusCode::REQUEST_TIMEOUT, self.template.protocol()).await?;
                return Ok(false);
            }
            ReadHead::PeerClosed => {
                debug!("peer closed the connection before sending a full head");
                return Ok(false);
            }
        };

        debug!(method = %head.method(), uri = head.request_uri(), ?payload_size, "request head parsed");

        let protocol = head.protocol();
        let connection = head.header("HTTP_CONNECTION").map(str::to_owned);
        let expects_continue = head.expects_continue();

        let (mut sender, body) = if payload_size.is_empty() {
            (None, RequestBody::empty())
        } else {
            let (sender, body) = body_channel(payload_size.length());
            (Some(sender), body)
        };

        if let Some(sender) = &mut sender {
            // bytes that arrived together with the head are the first body chunk
            match self.feed_body(sender) {
                Ok(()) if !sender.is_complete() => {
                    if expects_continue {
                        self.writer.write_continue().await?;
                        debug!("sent 100 continue");
                    } else {
                        self.timeout.clear();
                    }
                    self.transition(ConnectionState::ReadingBody);
                }
                Ok(()) => {}
                Err(e) => {
                    warn!(cause = %e, "can't decode request body");
                    self.respond_error(e.status_code(), protocol).await?;
                    return Ok(false);
                }
            }
        }

        let environ = Environ::new(Arc::clone(&self.template), head, body);
        let outcome = self.dispatch(handler, environ, &mut sender).await;

        let response = match outcome {
            Outcome::Handled(Ok(response)) => response,
            Outcome::Handled(Err(e)) => {
                error!(cause = %e, "handle request error");
                Response::new(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Outcome::TimedOut => {
                info!(timeout = ?self.config.request_timeout(), "request timed out");
                Response::new(StatusCode::REQUEST_TIMEOUT)
            }
            Outcome::PeerClosed => {
                debug!("peer closed the connection during the request");
                return Ok(false);
            }
            Outcome::Failed(e) => return Err(e),
        };

        // a body the handler did not wait for can't be told apart from the next request
        let force_close = sender.as_ref().is_some_and(|sender| !sender.is_complete());
        drop(sender);

        self.write_response(&CurrentRequest { protocol, connection, force_close }, response).await
    }

    async fn read_head(&mut self) -> Result<ReadHead, HttpError> {
        loop {
            match self.decoder.decode(&mut self.read_buf) {
                Ok(Some(Message::Header((head, payload_size)))) => return Ok(ReadHead::Head(head, payload_size)),
                Ok(Some(Message::Payload(_))) => {
                    return Ok(ReadHead::Invalid(ParseError::bad_request("payload received while expecting a head")));
                }
                Ok(None) => {}
                Err(e) => return Ok(ReadHead::Invalid(e)),
            }

            let read = select! {
                result = self.reader.read_buf(&mut self.read_buf) => result.map_err(ParseError::io)?,
                () = self.timeout.expired() => return Ok(ReadHead::TimedOut),
            };

            if read == 0 {
                return Ok(ReadHead::PeerClosed);
            }
            trace!(size = read, buffered = self.read_buf.len(), "received head bytes");
        }
    }

    /// Runs the handler while the rest of the body is streamed into it.
    async fn dispatch<H: Handler>(&mut self, handler: &H, environ: Environ, sender: &mut Option<BodySender>) -> Outcome {
        if self.state != ConnectionState::ReadingBody {
            self.transition(ConnectionState::Dispatched);
        }

        let call = AssertUnwindSafe(handler.call(environ)).catch_unwind();
        tokio::pin!(call);

        loop {
            let body_pending = sender.as_ref().is_some_and(|sender| !sender.is_complete());

            select! {
                biased;

                result = &mut call => {
                    let result = match result {
                        Ok(result) => result.map_err(Into::into),
                        Err(panic) => Err(format!("handler panicked: {}", panic_message(panic.as_ref())).into()),
                    };
                    return Outcome::Handled(result);
                }

                () = self.timeout.expired() => return Outcome::TimedOut,

                result = self.reader.read_buf(&mut self.read_buf), if body_pending => {
                    match result {
                        Ok(0) => return Outcome::PeerClosed,
                        Ok(_) => {}
                        Err(e) => return Outcome::Failed(ParseError::io(e).into()),
                    }

                    if let Some(sender) = sender.as_mut() {
                        if let Err(e) = self.feed_body(sender) {
                            return Outcome::Failed(e.into());
                        }
                    }
                }
            }
        }
    }

    /// Moves buffered body bytes into `sender`, completing it when the body is whole.
    fn feed_body(&mut self, sender: &mut BodySender) -> Result<(), ParseError> {
        while let Some(message) = self.decoder.decode(&mut self.read_buf)? {
            match message {
                Message::Payload(PayloadItem::Chunk(bytes)) => sender.push(&bytes),
                Message::Payload(PayloadItem::Eof) => {
                    sender.finish();
                    self.timeout.clear();
                    debug!(size = sender.progress().received, "request body complete");
                    if self.state == ConnectionState::ReadingBody {
                        self.transition(ConnectionState::Dispatched);
                    }
                    return Ok(());
                }
                Message::Header(_) => return Err(ParseError::bad_request("head received while reading a body")),
            }
        }

        Ok(())
    }

    async fn respond_error(&mut self, status: StatusCode, protocol: Version) -> Result<bool, HttpError> {
        let request = CurrentRequest { protocol, connection: None, force_close: true };
        self.write_response(&request, Response::new(status)).await
    }

    /// Writes `response` and returns whether the connection stays open.
    async fn write_response(&mut self, request: &CurrentRequest, response: Response) -> Result<bool, HttpError> {
        self.transition(ConnectionState::WritingResponse);
        self.timeout.clear();

        let close = request.force_close
            || should_close(response.status(), request.protocol, request.connection.as_deref(), response.header_value("Connection"));

        info!(status = response.status().as_u16(), close, "send response");

        let (head, body) = response.into_parts(request.protocol);
        self.writer.write(Message::Header(head))?;
        for chunk in body {
            self.writer.write(Message::Payload(PayloadItem::Chunk(chunk)))?;
        }
        self.writer.write(Message::Payload(PayloadItem::Eof))?;
        self.writer.flush().await?;

        Ok(!close)
    }

    async fn close(&mut self) {
        self.timeout.clear();
        if let Err(e) = self.writer.shutdown().await {
            debug!(cause = %e, "can't shutdown the connection cleanly");
        }
        self.transition(ConnectionState::Closed);
    }

    fn transition(&mut self, state: ConnectionState) {
        trace!(from = %self.state, to = %state, armed = self.timeout.is_armed(), "connection state");
        self.state = state;
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Decides whether the connection closes after a response.
///
/// Error statuses always close. Otherwise a request `Connection` header decides, falling
/// back to the protocol default (keep-alive for HTTP/1.1 only), and a `Connection`
/// header of the response overrides either way.
pub fn should_close(
    status: StatusCode,
    protocol: Version,
    request_connection: Option<&str>,
    response_connection: Option<&str>,
) -> bool {
    if status.as_u16() >= 400 {
        return true;
    }

    let is_close = |value: &str| value.trim().eq_ignore_ascii_case("close");

    match (response_connection, request_connection) {
        (Some(value), _) => is_close(value),
        (None, Some(value)) => is_close(value),
        (None, None) => protocol != Version::HTTP_11,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use std::io;
    use std::time::Duration;
    use tokio::io::{AsyncWriteExt, DuplexStream};
    use tokio::task::JoinHandle;
    use tokio::time::Instant;

    type BoxError = Box<dyn Error + Send + Sync>;

    fn text(status: StatusCode, body: &'static str) -> Response {
        Response::new(status).header("Content-Length", body.len().to_string()).body(body)
    }

    async fn app(mut environ: Environ) -> Result<Response, BoxError> {
        let path = environ.path_info().to_owned();
        let response = match path.as_str() {
            "/" => text(StatusCode::OK, "Hello"),
            "/echo" => {
                let mut seen = Vec::new();
                let body = environ.body_mut().finish_reading_with(|received, _| seen.push(received)).await?;
                Response::new(StatusCode::OK)
                    .header("Content-Length", body.len().to_string())
                    .header("X-Progress-Calls", seen.len().to_string())
                    .body(body)
            }
            "/slow" => {
                tokio::time::sleep(Duration::from_secs(10)).await;
                text(StatusCode::OK, "late")
            }
            "/fail" => return Err(io::Error::other("handler blew up").into()),
            "/panic" => panic!("handler bug"),
            "/bye" => text(StatusCode::OK, "bye").header("Connection", "close"),
            "/stay" => text(StatusCode::OK, "stay").header("Connection", "keep-alive"),
            _ => text(StatusCode::NOT_FOUND, "missing"),
        };
        Ok(response)
    }

    fn connect() -> (DuplexStream, JoinHandle<Result<(), HttpError>>) {
        let (client, server) = tokio::io::duplex(128 * 1024);
        let (reader, writer) = tokio::io::split(server);
        let template = Arc::new(EnvironTemplate::new("localhost", "8080").with_remote_addr("127.0.0.1"));
        let connection = HttpConnection::new(reader, writer, template, ConnectionConfig::default());
        let task = tokio::spawn(connection.process(Arc::new(make_handler(app))));
        (client, task)
    }

    /// Reads one response, relying on `Content-Length` to find its end.
    async fn read_response(client: &mut DuplexStream) -> String {
        let mut buf = Vec::new();
        loop {
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4) {
                let head = String::from_utf8_lossy(&buf[..end]).to_string();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("Content-Length: "))
                    .map_or(0, |value| value.trim().parse::<usize>().unwrap());
                if buf.len() >= end + length {
                    return String::from_utf8(buf[..end + length].to_vec()).unwrap();
                }
            }

            let mut chunk = [0u8; 1024];
            let n = client.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before a full response: {:?}", String::from_utf8_lossy(&buf));
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    async fn assert_closed(client: &mut DuplexStream) {
        let mut chunk = [0u8; 64];
        assert_eq!(client.read(&mut chunk).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn keep_alive_serves_a_second_request() {
        let (mut client, task) = connect();

        client.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();
        assert_eq!(read_response(&mut client).await, "HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nHello");

        client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
        assert!(read_response(&mut client).await.ends_with("Hello"));

        drop(client);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn connection_close_request_header() {
        let (mut client, task) = connect();

        client.write_all(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n").await.unwrap();
        assert!(read_response(&mut client).await.starts_with("HTTP/1.1 200 OK\r\n"));

        assert_closed(&mut client).await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn http_10_closes_unless_asked_to_keep_alive() {
        let (mut client, _task) = connect();
        client.write_all(b"GET / HTTP/1.0\r\n\r\n").await.unwrap();
        assert!(read_response(&mut client).await.starts_with("HTTP/1.0 200 OK\r\n"));
        assert_closed(&mut client).await;

        let (mut client, _task) = connect();
        client.write_all(b"GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\n").await.unwrap();
        assert!(read_response(&mut client).await.starts_with("HTTP/1.0 200 OK\r\n"));
        client.write_all(b"GET /stay HTTP/1.0\r\n\r\n").await.unwrap();
        assert!(read_response(&mut client).await.ends_with("stay"));
        client.write_all(b"GET / HTTP/1.0\r\n\r\n").await.unwrap();
        read_response(&mut client).await;
        assert_closed(&mut client).await;
    }

    #[tokio::test]
    async fn response_connection_header_overrides() {
        let (mut client, _task) = connect();
        client.write_all(b"GET /bye HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(read_response(&mut client).await, "HTTP/1.1 200 OK\r\nContent-Length: 3\r\nConnection: close\r\n\r\nbye");
        assert_closed(&mut client).await;
    }

    #[tokio::test]
    async fn body_split_over_chunks() {
        let (mut client, _task) = connect();

        client
            .write_all(b"POST /echo HTTP/1.1\r\nContent-Type: text/plain\r\nContent-Length: 10\r\n\r\n01234")
            .await
            .unwrap();
        tokio::task::yield_now().await;
        client.write_all(b"56789").await.unwrap();

        let response = read_response(&mut client).await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\nContent-Length: 10\r\n"));
        assert!(response.ends_with("\r\n\r\n0123456789"));

        client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
        assert!(read_response(&mut client).await.ends_with("Hello"));
    }

    #[tokio::test]
    async fn body_without_length_is_what_came_with_the_head() {
        let (mut client, _task) = connect();

        client.write_all(b"POST /echo HTTP/1.1\r\nContent-Type: text/plain\r\n\r\nname=ivan").await.unwrap();
        let response = read_response(&mut client).await;
        assert!(response.ends_with("\r\n\r\nname=ivan"));
    }

    #[tokio::test]
    async fn expect_continue() {
        let (mut client, _task) = connect();

        client
            .write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 4\r\nExpect: 100-continue\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(read_response(&mut client).await, "HTTP/1.1 100 Continue\r\n\r\n");

        client.write_all(b"abcd").await.unwrap();
        assert!(read_response(&mut client).await.ends_with("\r\n\r\nabcd"));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_close_of_an_idle_connection() {
        let start = Instant::now();
        let (mut client, task) = connect();

        assert_closed(&mut client).await;
        assert!(start.elapsed() >= Duration::from_millis(200));
        task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn keepalive_timeout_closes_silently() {
        let (mut client, _task) = connect();
        client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
        read_response(&mut client).await;

        let start = Instant::now();
        assert_closed(&mut client).await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_head_times_out_with_408() {
        let (mut client, _task) = connect();

        client.write_all(b"GET / HTTP/1.1\r\nHost: loc").await.unwrap();
        assert_eq!(read_response(&mut client).await, "HTTP/1.0 408 Request Timeout\r\n\r\n");
        assert_closed(&mut client).await;
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handler_times_out_with_408() {
        let (mut client, _task) = connect();

        client.write_all(b"GET /slow HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(read_response(&mut client).await, "HTTP/1.1 408 Request Timeout\r\n\r\n");
        assert_closed(&mut client).await;
    }

    #[tokio::test(start_paused = true)]
    async fn streaming_body_is_not_time_bounded() {
        let (mut client, _task) = connect();

        client.write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 4\r\n\r\nab").await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        client.write_all(b"cd").await.unwrap();

        assert!(read_response(&mut client).await.ends_with("\r\n\r\nabcd"));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_expect_continue_body_times_out() {
        let start = Instant::now();
        let (mut client, task) = connect();

        client
            .write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 4\r\nExpect: 100-continue\r\n\r\nab")
            .await
            .unwrap();
        assert_eq!(read_response(&mut client).await, "HTTP/1.1 100 Continue\r\n\r\n");
        assert_eq!(read_response(&mut client).await, "HTTP/1.1 408 Request Timeout\r\n\r\n");
        assert_closed(&mut client).await;
        assert!(start.elapsed() >= Duration::from_secs(5));
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn handler_error_is_answered_with_500() {
        let (mut client, task) = connect();

        client.write_all(b"GET /fail HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(read_response(&mut client).await, "HTTP/1.1 500 Internal Server Error\r\n\r\n");
        assert_closed(&mut client).await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn handler_panic_is_answered_with_500() {
        let (mut client, task) = connect();

        client.write_all(b"GET /panic HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(read_response(&mut client).await, "HTTP/1.1 500 Internal Server Error\r\n\r\n");
        assert_closed(&mut client).await;
        task.await.unwrap().unwrap();
    }

    #[test]
    fn panic_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }

    #[tokio::test]
    async fn protocol_errors_are_answered_and_closed() {
        let cases: [(&[u8], &str); 3] = [
            (b"GET / HTTP/2.0\r\n\r\n", "HTTP/1.0 505 HTTP Version Not Supported\r\n\r\n"),
            (b"GET /a%zz HTTP/1.1\r\n\r\n", "HTTP/1.0 400 Bad Request\r\n\r\n"),
            (b"POST / HTTP/1.1\r\nContent-Length: many\r\n\r\n", "HTTP/1.0 400 Bad Request\r\n\r\n"),
        ];

        for (request, expected) in cases {
            let (mut client, _task) = connect();
            client.write_all(request).await.unwrap();
            assert_eq!(read_response(&mut client).await, expected);
            assert_closed(&mut client).await;
        }
    }

    #[tokio::test]
    async fn overlong_request_line_is_answered_with_414() {
        let (mut client, _task) = connect();

        let line = format!("GET /{}", "a".repeat(3000));
        client.write_all(line.as_bytes()).await.unwrap();
        assert_eq!(read_response(&mut client).await, "HTTP/1.0 414 URI Too Long\r\n\r\n");
        assert_closed(&mut client).await;
    }

    #[tokio::test]
    async fn error_status_closes_the_connection() {
        let (mut client, _task) = connect();

        client.write_all(b"GET /nowhere HTTP/1.1\r\nConnection: keep-alive\r\n\r\n").await.unwrap();
        assert!(read_response(&mut client).await.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert_closed(&mut client).await;
    }

    #[tokio::test]
    async fn peer_closing_mid_head_gets_no_response() {
        let (mut client, task) = connect();

        client.write_all(b"GET / HTT").await.unwrap();
        client.shutdown().await.unwrap();

        assert_closed(&mut client).await;
        task.await.unwrap().unwrap();
    }

    #[test]
    fn close_decision() {
        let ok = StatusCode::OK;
        assert!(!should_close(ok, Version::HTTP_11, None, None));
        assert!(should_close(ok, Version::HTTP_10, None, None));
        assert!(should_close(ok, Version::HTTP_11, Some("close"), None));
        assert!(should_close(ok, Version::HTTP_11, Some("Close"), None));
        assert!(!should_close(ok, Version::HTTP_10, Some("keep-alive"), None));
        assert!(should_close(ok, Version::HTTP_11, None, Some("close")));
        assert!(!should_close(ok, Version::HTTP_10, None, Some("keep-alive")));
        assert!(!should_close(ok, Version::HTTP_11, Some("close"), Some("keep-alive")));
        assert!(should_close(StatusCode::NOT_FOUND, Version::HTTP_11, None, Some("keep-alive")));
        assert!(should_close(StatusCode::INTERNAL_SERVER_ERROR, Version::HTTP_11, Some("keep-alive"), None));
    }
}
