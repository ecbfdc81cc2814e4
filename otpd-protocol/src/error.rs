//! Protocol error types.

use thiserror::Error;

/// Protocol-level errors that can occur during framing or message parsing.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid length header: {0:?}")]
    InvalidHeader([u8; crate::HEADER_SIZE]),

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("request carries role tag {0:?}, expected '-'")]
    RoleMismatch(char),

    #[error("request payload is missing the field delimiter")]
    MissingDelimiter,

    #[error("request payload is empty")]
    EmptyPayload,

    #[error("invalid UTF-8 in payload")]
    InvalidUtf8,
}

impl ProtocolError {
    /// Returns whether the error is a role-tag mismatch, which the server
    /// answers with the rejection sentinel instead of closing outright.
    pub fn is_role_mismatch(&self) -> bool {
        matches!(self, ProtocolError::RoleMismatch(_))
    }
}
