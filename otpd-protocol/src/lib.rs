//! # otpd-protocol
//!
//! Wire protocol implementation for otpd (PXP - pad exchange protocol).
//!
//! This crate provides:
//! - Length-prefixed framing over a byte stream
//! - Typed request parsing with role-tag validation
//! - The rejection sentinel for sibling-protocol mismatches
//! - Protocol error types and constants
//!
//! Every exchange is exactly two frames per connection: a tagged request
//! (ciphertext and key) and an untagged response (plaintext), or a
//! sentinel header in place of the response when the server rejects the
//! request's role tag.

pub mod codec;
pub mod error;
pub mod frame;
pub mod message;

pub use codec::Decoder;
pub use error::ProtocolError;
pub use frame::{encode_frame, encode_rejection, Frame};
pub use message::DecryptRequest;

/// Default port for the otpd server.
pub const DEFAULT_PORT: u16 = 57101;

/// Size of the fixed length header in bytes.
pub const HEADER_SIZE: usize = 10;

/// Role tag marking a decrypt request.
pub const DECRYPT_TAG: u8 = b'-';

/// Role tag used by the sibling encryption protocol.
pub const ENCRYPT_TAG: u8 = b'+';

/// First header byte of the rejection sentinel.
pub const REJECT_BYTE: u8 = b'*';

/// Delimiter between the ciphertext and key fields of a request.
pub const FIELD_DELIMITER: u8 = b',';

/// Maximum frame payload size (16 MiB).
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;
