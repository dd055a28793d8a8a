use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, info_span, warn, Instrument, Level};
use tracing_subscriber::FmtSubscriber;
use trellis_http::connection::{ConnectionConfig, HttpConnection};
use trellis_http::protocol::EnvironTemplate;

use crate::app::App;
use crate::router::Router;

#[derive(Debug)]
pub struct ServerBuilder {
    app: Option<App>,
    address: Option<io::Result<Vec<SocketAddr>>>,
    server_name: Option<String>,
    server_port: Option<String>,
    config: ConnectionConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { app: None, address: None, server_name: None, server_port: None, config: ConnectionConfig::default() }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn router(self, router: Router) -> Self {
        self.app(App::new(router))
    }

    pub fn app(mut self, app: App) -> Self {
        self.app = Some(app);
        self
    }

    /// `SERVER_NAME` of every request; defaults to the local address a connection came in on.
    pub fn server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = Some(server_name.into());
        self
    }

    /// `SERVER_PORT` of every request; defaults to the local port a connection came in on.
    pub fn server_port(mut self, server_port: impl Into<String>) -> Self {
        self.server_port = Some(server_port.into());
        self
    }

    pub fn connection_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Server, ServerError> {
        let app = self.app.ok_or(ServerError::MissingRouter)?;
        let address = self.address.ok_or(ServerError::MissingAddress)?.map_err(ServerError::InvalidAddress)?;
        Ok(Server {
            app: Arc::new(app),
            address,
            server_name: self.server_name,
            server_port: self.server_port,
            config: self.config,
        })
    }
}

#[derive(Debug)]
pub struct Server {
    app: Arc<App>,
    address: Vec<SocketAddr>,
    server_name: Option<String>,
    server_port: Option<String>,
    config: ConnectionConfig,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("router must be set")]
    MissingRouter,
    #[error("address must be set")]
    MissingAddress,
    #[error("address can't be resolved: {0}")]
    InvalidAddress(#[source] io::Error),
    #[error("failed to bind {address:?}: {source}")]
    Bind { address: Vec<SocketAddr>, source: io::Error },
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Installs a default `tracing` subscriber, binds the configured address and serves
    /// connections until the process ends.
    pub async fn start(self) -> Result<(), ServerError> {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            debug!("global subscriber already set");
        }

        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(ServerError::Bind { address: self.address, source: e });
            }
        };

        self.serve(tcp_listener).await;
        Ok(())
    }

    /// Serves connections accepted from `tcp_listener`, one task each.
    pub async fn serve(self, tcp_listener: TcpListener) {
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let local_addr = match tcp_stream.local_addr() {
                Ok(local_addr) => local_addr,
                Err(e) => {
                    warn!(cause = %e, "connection lost its local address");
                    continue;
                }
            };

            let server_name = self.server_name.clone().unwrap_or_else(|| local_addr.ip().to_string());
            let server_port = self.server_port.clone().unwrap_or_else(|| local_addr.port().to_string());
            let template = Arc::new(EnvironTemplate::new(server_name, server_port).with_remote_addr(remote_addr.ip().to_string()));

            let app = Arc::clone(&self.app);
            let config = self.config;
            let span = info_span!("connection", remote = %remote_addr);

            tokio::spawn(
                async move {
                    let (reader, writer) = tcp_stream.into_split();
                    let connection = HttpConnection::new(reader, writer, template, config);
                    match connection.process(app).await {
                        Ok(_) => {
                            debug!("finished process, connection shutdown");
                        }
                        Err(e) => {
                            error!("service has error, cause {}, connection shutdown", e);
                        }
                    }
                }
                .instrument(span),
            );
        }
    }
}
