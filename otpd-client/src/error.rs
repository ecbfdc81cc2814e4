//! Client error types.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] otpd_protocol::ProtocolError),

    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("key is shorter than the ciphertext: {key_len} < {ciphertext_len}")]
    KeyTooShort {
        key_len: usize,
        ciphertext_len: usize,
    },

    #[error("ciphertext contains characters outside the alphabet")]
    InvalidCiphertext,

    #[error("server rejected the connection: this server does not speak the decrypt protocol")]
    Rejected,

    #[error("connection closed before a complete response arrived")]
    ConnectionClosed,

    #[error("request timed out")]
    Timeout,

    #[error("response is not valid UTF-8")]
    InvalidResponse,
}

impl ClientError {
    /// Returns whether the error is a local input failure - an unreadable
    /// file, a short key, or a bad ciphertext - detected before any
    /// network I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::ReadInput { .. }
                | ClientError::KeyTooShort { .. }
                | ClientError::InvalidCiphertext
        )
    }
}
