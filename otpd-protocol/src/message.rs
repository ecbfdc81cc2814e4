//! Typed request message for PXP.
//!
//! The request payload is `-` + ciphertext + `,` + key: a one-byte role
//! tag, the ciphertext field, a single delimiter byte, and the key field.
//! Both tag bytes and the delimiter sit outside the cipher alphabet, so
//! well-formed fields can never contain them. The payload is parsed once
//! here, at the protocol boundary, into named fields.

use crate::error::ProtocolError;
use crate::{DECRYPT_TAG, FIELD_DELIMITER};
use bytes::{BufMut, Bytes, BytesMut};

/// A decrypt request: ciphertext plus the key that covers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptRequest {
    pub ciphertext: String,
    pub key: String,
}

impl DecryptRequest {
    pub fn new(ciphertext: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            ciphertext: ciphertext.into(),
            key: key.into(),
        }
    }

    /// Encodes the request into its tagged wire payload.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(2 + self.ciphertext.len() + self.key.len());
        buf.put_u8(DECRYPT_TAG);
        buf.put_slice(self.ciphertext.as_bytes());
        buf.put_u8(FIELD_DELIMITER);
        buf.put_slice(self.key.as_bytes());
        buf.freeze()
    }

    /// Parses a request from a frame payload.
    ///
    /// The role tag is checked first: a payload tagged for the sibling
    /// encryption protocol (or anything else) yields
    /// [`ProtocolError::RoleMismatch`], which the server answers with the
    /// rejection sentinel. The ciphertext ends at the first delimiter
    /// byte; everything after it is the key.
    pub fn parse(payload: &[u8]) -> Result<Self, ProtocolError> {
        let (&tag, rest) = payload.split_first().ok_or(ProtocolError::EmptyPayload)?;
        if tag != DECRYPT_TAG {
            return Err(ProtocolError::RoleMismatch(tag as char));
        }

        let delim = rest
            .iter()
            .position(|&b| b == FIELD_DELIMITER)
            .ok_or(ProtocolError::MissingDelimiter)?;
        let ciphertext = std::str::from_utf8(&rest[..delim])
            .map_err(|_| ProtocolError::InvalidUtf8)?
            .to_string();
        let key = std::str::from_utf8(&rest[delim + 1..])
            .map_err(|_| ProtocolError::InvalidUtf8)?
            .to_string();

        Ok(Self { ciphertext, key })
    }
}
