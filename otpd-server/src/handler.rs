//! Request handling.
//!
//! Pure protocol logic, separated from the socket plumbing in
//! [`crate::server`]: parse the frame payload into a typed request,
//! check the role tag, decrypt, produce the reply.

use crate::error::ServerError;
use otpd_protocol::{DecryptRequest, ProtocolError};

/// The outcome of handling a request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Decryption succeeded; send the plaintext frame.
    Plaintext(String),
    /// The role tag belongs to the sibling protocol; send the rejection
    /// sentinel and close without decrypting.
    Reject,
}

/// Handles one request payload.
///
/// A role-tag mismatch is a [`Reply::Reject`], not an error: the
/// connection still gets an answer (the sentinel). Anything else that
/// goes wrong - a malformed payload, non-alphabet symbols, a key that
/// does not cover the ciphertext - is an error that fails this worker
/// without a response.
pub fn handle_request(payload: &[u8]) -> Result<Reply, ServerError> {
    let request = match DecryptRequest::parse(payload) {
        Ok(request) => request,
        Err(ProtocolError::RoleMismatch(tag)) => {
            tracing::warn!("Rejecting request tagged {:?} for the sibling protocol", tag);
            return Ok(Reply::Reject);
        }
        Err(e) => return Err(e.into()),
    };

    let plaintext = otpd_cipher::decrypt(&request.ciphertext, &request.key)?;
    Ok(Reply::Plaintext(plaintext))
}
