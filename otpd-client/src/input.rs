//! Local input loading and validation.
//!
//! Both inputs come from local files. Validation happens here, before a
//! socket is ever opened: the key must cover the ciphertext, and the
//! ciphertext must be closed over the alphabet. The key itself is not
//! checked for alphabet membership; the server validates it when it
//! decrypts.

use crate::error::ClientError;
use std::path::Path;

/// A validated ciphertext/key pair ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadInput {
    pub ciphertext: String,
    pub key: String,
}

impl PadInput {
    /// Reads the ciphertext and key files and validates them.
    pub fn from_files(
        ciphertext_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
    ) -> Result<Self, ClientError> {
        let ciphertext = read_input(ciphertext_path.as_ref())?;
        let key = read_input(key_path.as_ref())?;
        Self::new(ciphertext, key)
    }

    /// Validates a ciphertext/key pair.
    pub fn new(ciphertext: String, key: String) -> Result<Self, ClientError> {
        if key.len() < ciphertext.len() {
            return Err(ClientError::KeyTooShort {
                key_len: key.len(),
                ciphertext_len: ciphertext.len(),
            });
        }
        if !otpd_cipher::is_valid(&ciphertext) {
            return Err(ClientError::InvalidCiphertext);
        }
        Ok(Self { ciphertext, key })
    }
}

/// Reads a file fully, stripping the single trailing newline that pad
/// files end with.
fn read_input(path: &Path) -> Result<String, ClientError> {
    let mut content = std::fs::read_to_string(path).map_err(|e| ClientError::ReadInput {
        path: path.display().to_string(),
        source: e,
    })?;
    if content.ends_with('\n') {
        content.pop();
    }
    Ok(content)
}
