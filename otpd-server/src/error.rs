//! Server error types.

use thiserror::Error;

/// Server errors.
///
/// Errors raised inside a connection worker are fatal to that worker
/// only; the acceptor loop keeps running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] otpd_protocol::ProtocolError),

    #[error("bad request: {0}")]
    BadRequest(#[from] otpd_cipher::CipherError),

    #[error("connection idle for too long")]
    IdleTimeout,

    #[error("configuration error: {0}")]
    Config(String),
}
