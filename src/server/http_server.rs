//! HTTP server implementation.

use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tokio::signal;
use log::{debug, info, warn, error};
use std::net::SocketAddr;

use crate::parser::{Error as ParserError, HttpRequest, find_head_end, parse_request};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::gate::Gate;
use crate::server::handler::HandlerSet;
use crate::server::record::RequestRecord;
use crate::server::response::WireResponse;
use crate::server::translate::translate;

/// One server instance: the request pipeline shared by all of its connections.
pub struct HttpServer<S> {
    /// The server configuration.
    pub config: ServerConfig,
    host: String,
    port: u16,
    gate: Arc<Gate<S>>,
}

impl<S: Send + 'static> HttpServer<S> {
    /// Create a server for the listener at `host:port`.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        session: S,
        handlers: HandlerSet<S>,
        config: ServerConfig,
    ) -> Self {
        Self {
            config,
            host: host.into(),
            port,
            gate: Arc::new(Gate::new(session, handlers)),
        }
    }

    pub fn gate(&self) -> &Arc<Gate<S>> {
        &self.gate
    }

    /// Handle a new connection.
    async fn handle_new_connection(
        self: &Arc<Self>,
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: &Arc<Semaphore>,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = WireResponse::plain(503, "Server is at capacity, please try again later");
                let _ = socket.write_all(&response.to_bytes()).await;
                return;
            }
        };

        let server = Arc::clone(self);
        tasks.spawn(async move {
            // Released when the connection is done
            let _permit = permit;

            debug!("Connection from: {addr}");
            if let Err(e) = server.handle_connection(&mut socket).await {
                error!("Error handling connection from {addr}: {e}");
            }
        });
    }

    /// Handle connection errors. Returns true if the accept loop should stop.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        // For other errors, wait a bit before retrying
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(&self, tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let drained = tokio::time::timeout(self.config.shutdown_timeout(), async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    if !e.is_cancelled() {
                        error!("Task failed during shutdown: {e}");
                    }
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!("Shutdown timeout elapsed, aborting {len} connections", len = tasks.len());
            tasks.shutdown().await;
        }

        info!("Server on {host}:{port} shut down", host = self.host, port = self.port);
    }

    /// Accept connections until shutdown is requested.
    pub async fn serve(self: Arc<Self>, listener: TcpListener, mut shutdown_rx: watch::Receiver<bool>) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let mut tasks = JoinSet::new();
        let ctrl_c = wait_for_ctrl_c(self.config.handle_ctrl_c);
        tokio::pin!(ctrl_c);

        info!("Server listening on http://{host}:{port}", host = self.host, port = self.port);

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Shutting down server...");
                        break;
                    }
                }

                () = &mut ctrl_c => break,

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            self.handle_new_connection(socket, addr, &semaphore, &mut tasks).await;
                        }
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }

                // Reap finished connections so the set does not grow unbounded
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        drop(listener);
        self.perform_shutdown(&mut tasks).await;
    }

    /// Handle a single connection: one request, one response.
    pub async fn handle_connection(
        &self,
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
    ) -> Result<(), Error> {
        let request = match read_request(socket, self.config.read_buffer_size, self.config.max_body_size).await {
            Ok(Some(request)) => request,
            // Connection closed
            Ok(None) => return Ok(()),
            Err(Error::IoError(e)) => return Err(Error::IoError(e)),
            Err(e) => {
                socket.write_all(&error_response(&e).to_bytes()).await?;
                return Err(e);
            }
        };

        if request.is_websocket_upgrade() {
            let e = Error::NotImplemented("websocket upgrade");
            socket.write_all(&error_response(&e).to_bytes()).await?;
            return Err(e);
        }

        debug!("{method} {path}", method = request.method, path = request.path);
        let record = RequestRecord::from_request(request, &self.host, self.port);

        let outcome = match self.gate.invoke_blocking(record).await {
            Ok(value) => {
                let mut wire = WireResponse::new();
                translate(value, &mut wire, self.config.strict_translation).map(|()| wire)
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(wire) => {
                socket.write_all(&wire.to_bytes()).await?;
                socket.flush().await?;
                Ok(())
            }
            Err(e) => {
                socket.write_all(&error_response(&e).to_bytes()).await?;
                Err(e)
            }
        }
    }
}

/// Resolves on Ctrl+C when enabled, otherwise never.
async fn wait_for_ctrl_c(enabled: bool) {
    if enabled {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating graceful shutdown");
                return;
            }
            Err(e) => error!("Error setting up Ctrl+C handler: {e}"),
        }
    }
    std::future::pending::<()>().await
}

/// Read one complete request: the head, then as many body bytes as
/// `Content-Length` announces. Returns `None` if the peer closed first.
async fn read_request(
    socket: &mut (impl AsyncRead + Unpin),
    read_buffer_size: usize,
    max_body_size: usize,
) -> Result<Option<HttpRequest>, Error> {
    let mut buf = Vec::new();
    let mut chunk = vec![0; read_buffer_size.max(1)];

    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            // Peer is done sending; judge what arrived
            return Ok(Some(parse_request(&buf)?));
        }
        buf.extend_from_slice(&chunk[..n]);

        match find_head_end(&buf) {
            Some(end) if end > read_buffer_size => {
                return Err(ParserError::HeadTooLarge(read_buffer_size).into());
            }
            Some(_) => {}
            None if buf.len() > read_buffer_size => {
                return Err(ParserError::HeadTooLarge(read_buffer_size).into());
            }
            None => continue,
        }

        match parse_request(&buf) {
            Ok(request) if request.body.len() > max_body_size => {
                return Err(ParserError::BodyTooLarge(max_body_size).into());
            }
            Ok(request) => return Ok(Some(request)),
            Err(ParserError::IncompleteBody { expected, .. }) if expected > max_body_size => {
                return Err(ParserError::BodyTooLarge(max_body_size).into());
            }
            Err(ParserError::IncompleteBody { .. }) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// The reply the client gets when a request cannot be answered normally.
fn error_response(e: &Error) -> WireResponse {
    match e {
        Error::ParseError(ParserError::BodyTooLarge(_)) => WireResponse::plain(413, e.to_string()),
        Error::ParseError(ParserError::HeadTooLarge(_)) => WireResponse::plain(431, e.to_string()),
        Error::ParseError(_) => WireResponse::plain(400, format!("Error parsing request: {e}")),
        Error::NotImplemented(_) => WireResponse::plain(501, e.to_string()),
        _ => WireResponse::plain(500, format!("Internal server error: {e}")),
    }
}
