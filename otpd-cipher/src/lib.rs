//! # otpd-cipher
//!
//! The modular substitution transform used by otpd.
//!
//! The cipher operates over a fixed 27-symbol alphabet: the uppercase
//! letters `A`-`Z` at positions 0..=25 and the space character at
//! position 26. Encryption adds key positions to plaintext positions
//! modulo 27; decryption subtracts them. No cryptographic security is
//! claimed - the design goal is exact modular arithmetic and alphabet
//! closure.

use thiserror::Error;

/// The ordered 27-symbol alphabet: `A`-`Z` followed by space.
pub const ALPHABET: &[u8; 27] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ ";

/// Number of symbols in the alphabet.
pub const ALPHABET_LEN: usize = ALPHABET.len();

/// Cipher errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("key is shorter than the text: {key_len} < {text_len}")]
    KeyTooShort { key_len: usize, text_len: usize },

    #[error("symbol {0:?} is not in the alphabet")]
    InvalidSymbol(char),
}

/// Returns the position of `symbol` in the alphabet, or `None` if the
/// symbol is not a member.
pub fn position(symbol: u8) -> Option<usize> {
    match symbol {
        b'A'..=b'Z' => Some((symbol - b'A') as usize),
        b' ' => Some(26),
        _ => None,
    }
}

/// Returns true iff every byte of `text` is an alphabet symbol.
///
/// The empty string is valid.
pub fn is_valid(text: &str) -> bool {
    text.bytes().all(|b| position(b).is_some())
}

/// Decrypts `ciphertext` with `key`.
///
/// For each index `i`, the plaintext symbol is
/// `ALPHABET[(pos(c_i) + 27 - pos(k_i)) % 27]`. The key must be at least
/// as long as the ciphertext; only the first `ciphertext.len()` key
/// symbols are consumed.
pub fn decrypt(ciphertext: &str, key: &str) -> Result<String, CipherError> {
    transform(ciphertext, key, |c, k| (c + ALPHABET_LEN - k) % ALPHABET_LEN)
}

/// Encrypts `plaintext` with `key` - the additive inverse of [`decrypt`].
///
/// For each index `i`, the ciphertext symbol is
/// `ALPHABET[(pos(p_i) + pos(k_i)) % 27]`.
pub fn encrypt(plaintext: &str, key: &str) -> Result<String, CipherError> {
    transform(plaintext, key, |p, k| (p + k) % ALPHABET_LEN)
}

fn transform(
    text: &str,
    key: &str,
    combine: impl Fn(usize, usize) -> usize,
) -> Result<String, CipherError> {
    if key.len() < text.len() {
        return Err(CipherError::KeyTooShort {
            key_len: key.len(),
            text_len: text.len(),
        });
    }

    let mut out = String::with_capacity(text.len());
    for (t, k) in text.bytes().zip(key.bytes()) {
        let ti = position(t).ok_or(CipherError::InvalidSymbol(t as char))?;
        let ki = position(k).ok_or(CipherError::InvalidSymbol(k as char))?;
        out.push(ALPHABET[combine(ti, ki)] as char);
    }
    Ok(out)
}
