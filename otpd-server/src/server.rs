//! TCP server implementation.
//!
//! One long-lived acceptor loop plus one independent task per accepted
//! connection. Workers share no mutable state; each owns its decoder and
//! buffers for the lifetime of the connection. The protocol is strictly
//! one request/response pair per connection, then close.

use crate::error::ServerError;
use crate::handler::{handle_request, Reply};
use otpd_protocol::{encode_frame, encode_rejection, Decoder, Frame};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Per-connection idle timeout (bounds the wait for a complete
    /// request frame).
    pub idle_timeout: Duration,
    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], otpd_protocol::DEFAULT_PORT)),
            idle_timeout: Duration::from_secs(60),
            max_connections: 1000,
        }
    }
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }
}

impl From<&crate::config::Config> for ServerConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            bind_addr: config.network.bind_addr,
            idle_timeout: config.network.idle_timeout(),
            max_connections: config.network.max_connections,
        }
    }
}

/// Server statistics.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub connections_total: AtomicU64,
    pub connections_active: AtomicU64,
    pub requests_total: AtomicU64,
    pub rejections_total: AtomicU64,
    pub errors_total: AtomicU64,
}

/// TCP server for otpd.
pub struct Server {
    config: ServerConfig,
    stats: Arc<ServerStats>,
    shutdown: broadcast::Sender<()>,
    running: AtomicBool,
}

impl Server {
    /// Creates a new server.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            stats: Arc::new(ServerStats::default()),
            shutdown: shutdown_tx,
            running: AtomicBool::new(false),
        }
    }

    /// Binds the configured address and runs the server.
    ///
    /// A bind failure is fatal; per-connection failures are not.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Runs the accept loop on an already-bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        self.running.store(true, Ordering::SeqCst);
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => self.dispatch(stream, addr),
                        Err(e) => {
                            tracing::error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Server shutting down");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Spawns an isolated worker for one accepted connection.
    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        // Reserve the slot first so racing accepts cannot overshoot the
        // limit; give it back if the reservation went over.
        let active = self.stats.connections_active.fetch_add(1, Ordering::AcqRel);
        if active >= self.config.max_connections as u64 {
            self.stats.connections_active.fetch_sub(1, Ordering::AcqRel);
            tracing::warn!("Connection limit reached, rejecting {}", addr);
            drop(stream);
            return;
        }

        self.stats.connections_total.fetch_add(1, Ordering::Relaxed);

        let stats = self.stats.clone();
        let idle_timeout = self.config.idle_timeout;

        tokio::spawn(async move {
            tracing::debug!("Client connected: {}", addr);

            let result = handle_connection(stream, addr, idle_timeout, &stats).await;
            if let Err(e) = result {
                tracing::warn!("[{}] Connection failed: {}", addr, e);
                stats.errors_total.fetch_add(1, Ordering::Relaxed);
            }

            stats.connections_active.fetch_sub(1, Ordering::AcqRel);
            tracing::debug!("Client disconnected: {}", addr);
        });
    }

    /// Initiates server shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }

    /// Returns whether the server is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns server statistics.
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }
}

/// Handles a single connection: receive the request frame, dispatch, send
/// the response (or the sentinel), close.
async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    idle_timeout: Duration,
    stats: &ServerStats,
) -> Result<(), ServerError> {
    let payload = tokio::time::timeout(idle_timeout, read_request(&mut stream))
        .await
        .map_err(|_| ServerError::IdleTimeout)??;

    stats.requests_total.fetch_add(1, Ordering::Relaxed);
    tracing::debug!("[{}] Request payload: {} bytes", addr, payload.len());

    match handle_request(&payload)? {
        Reply::Plaintext(plaintext) => {
            let frame = encode_frame(plaintext.as_bytes())?;
            tracing::debug!("[{}] Sending plaintext frame ({} bytes)", addr, frame.len());
            stream.write_all(&frame).await?;
        }
        Reply::Reject => {
            stats.rejections_total.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("[{}] Sending rejection sentinel", addr);
            stream.write_all(&encode_rejection()).await?;
        }
    }

    stream.shutdown().await?;
    Ok(())
}

/// Reads from the socket until one complete request frame is decoded.
async fn read_request(stream: &mut TcpStream) -> Result<bytes::Bytes, ServerError> {
    let mut decoder = Decoder::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Err(ServerError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before a complete request arrived",
            )));
        }

        decoder.extend(&buf[..n]);
        match decoder.decode()? {
            Some(Frame::Payload(payload)) => return Ok(payload),
            // Only servers produce the sentinel; a client sending one is
            // sending a malformed header.
            Some(Frame::Rejected) => {
                let mut raw = [0u8; otpd_protocol::HEADER_SIZE];
                raw[0] = otpd_protocol::REJECT_BYTE;
                return Err(ServerError::Protocol(
                    otpd_protocol::ProtocolError::InvalidHeader(raw),
                ));
            }
            None => continue,
        }
    }
}
