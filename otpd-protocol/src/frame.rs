//! Length-prefixed frame format for PXP.
//!
//! Frame layout (10-byte header + payload):
//!
//! ```text
//! +----------------------+---------------------+
//! | length header        | payload             |
//! | 10 bytes, ASCII      | exactly the number  |
//! | decimal digits, NUL  | of bytes the header |
//! | padded on the right  | declared            |
//! +----------------------+---------------------+
//! ```
//!
//! A server that rejects a request's role tag sends a sentinel header in
//! place of a length header: the byte `*` followed by nine NUL bytes. The
//! sentinel is a full 10-byte header, so the receiver always performs one
//! fixed-width read and never has to guess whether more header bytes are
//! coming.

use crate::error::ProtocolError;
use crate::{HEADER_SIZE as HEADER, MAX_PAYLOAD_SIZE, REJECT_BYTE};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// A decoded frame: either a payload or the rejection sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A payload of the declared length.
    Payload(Bytes),
    /// The server rejected the request's role tag.
    Rejected,
}

/// Encodes `payload` into a framed byte buffer: the 10-byte decimal
/// length header followed by the payload bytes.
pub fn encode_frame(payload: &[u8]) -> Result<BytesMut, ProtocolError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let mut buf = BytesMut::with_capacity(HEADER + payload.len());
    buf.put_slice(&encode_header(payload.len()));
    buf.put_slice(payload);
    Ok(buf)
}

/// Encodes the rejection sentinel: a full header-width frame with no payload.
pub fn encode_rejection() -> BytesMut {
    let mut header = [0u8; HEADER];
    header[0] = REJECT_BYTE;
    BytesMut::from(&header[..])
}

fn encode_header(len: usize) -> [u8; HEADER] {
    let mut header = [0u8; HEADER];
    let digits = len.to_string();
    header[..digits.len()].copy_from_slice(digits.as_bytes());
    header
}

/// Parsed header: a declared payload length or the rejection sentinel.
enum Header {
    Length(usize),
    Rejected,
}

fn decode_header(raw: [u8; HEADER]) -> Result<Header, ProtocolError> {
    if raw[0] == REJECT_BYTE {
        return Ok(Header::Rejected);
    }

    // Decimal digits, then NUL padding to the full header width.
    let digits_end = raw.iter().position(|&b| b == 0).unwrap_or(HEADER);
    let digits = &raw[..digits_end];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(ProtocolError::InvalidHeader(raw));
    }
    if raw[digits_end..].iter().any(|&b| b != 0) {
        return Err(ProtocolError::InvalidHeader(raw));
    }

    // 10 decimal digits always fit in u64; reject absurd lengths before
    // converting so a garbage header cannot drive an allocation.
    let len: u64 = std::str::from_utf8(digits)
        .map_err(|_| ProtocolError::InvalidHeader(raw))?
        .parse()
        .map_err(|_| ProtocolError::InvalidHeader(raw))?;
    if len as usize > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size: len as usize,
            max: MAX_PAYLOAD_SIZE,
        });
    }
    Ok(Header::Length(len as usize))
}

impl Frame {
    /// Decodes a frame from `buf`.
    ///
    /// Returns `Ok(Some(frame))` if a complete frame was decoded (the
    /// frame's bytes are consumed from `buf`), `Ok(None)` if more data is
    /// needed, or `Err` on a malformed header. The header must be complete
    /// before its length is parsed, and exactly the declared number of
    /// payload bytes is consumed - never more.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Self>, ProtocolError> {
        if buf.len() < HEADER {
            return Ok(None);
        }

        // Peek at the header without consuming it; the payload may still
        // be incomplete.
        let raw: [u8; HEADER] = buf[..HEADER].try_into().expect("sliced to header size");
        let len = match decode_header(raw)? {
            Header::Rejected => {
                buf.advance(HEADER);
                return Ok(Some(Frame::Rejected));
            }
            Header::Length(len) => len,
        };

        if buf.len() < HEADER + len {
            return Ok(None);
        }

        buf.advance(HEADER);
        let payload = buf.split_to(len).freeze();
        Ok(Some(Frame::Payload(payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_header_layout() {
        let buf = encode_frame(b"HELLO").unwrap();
        assert_eq!(&buf[..], b"5\0\0\0\0\0\0\0\0\0HELLO");
    }

    #[test]
    fn test_roundtrip() {
        let mut buf = encode_frame(b"SOME PAYLOAD").unwrap();
        let frame = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame, Frame::Payload(Bytes::from_static(b"SOME PAYLOAD")));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_payload() {
        let mut buf = encode_frame(b"").unwrap();
        let frame = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame, Frame::Payload(Bytes::new()));
    }

    #[test]
    fn test_incomplete_header() {
        let mut buf = BytesMut::from(&b"12"[..]);
        assert!(Frame::decode(&mut buf).unwrap().is_none());
        // Nothing consumed while waiting for the rest of the header.
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_incomplete_payload() {
        let full = encode_frame(b"ABCDEF").unwrap();
        let mut buf = BytesMut::from(&full[..full.len() - 2]);
        assert!(Frame::decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_rejection_sentinel() {
        let mut buf = encode_rejection();
        assert_eq!(buf.len(), HEADER);
        assert_eq!(buf[0], REJECT_BYTE);
        let frame = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame, Frame::Rejected);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_payload_may_contain_delimiter_bytes() {
        // Framing is length-driven, not delimiter-driven: a payload that
        // contains ',' or '*' must survive intact.
        let mut buf = encode_frame(b"*,-,*").unwrap();
        let frame = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame, Frame::Payload(Bytes::from_static(b"*,-,*")));
    }

    #[test]
    fn test_invalid_header() {
        let mut buf = BytesMut::from(&b"12a4\0\0\0\0\0\0"[..]);
        assert!(matches!(
            Frame::decode(&mut buf),
            Err(ProtocolError::InvalidHeader(_))
        ));

        // All-NUL header carries no digits.
        let mut buf = BytesMut::from(&[0u8; HEADER][..]);
        assert!(matches!(
            Frame::decode(&mut buf),
            Err(ProtocolError::InvalidHeader(_))
        ));

        // Digits after NUL padding are malformed.
        let mut buf = BytesMut::from(&b"1\0\0\0\0\0\0\0\09"[..]);
        assert!(matches!(
            Frame::decode(&mut buf),
            Err(ProtocolError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_declared_length_too_large() {
        let mut buf = BytesMut::from(&b"9999999999"[..]);
        assert!(matches!(
            Frame::decode(&mut buf),
            Err(ProtocolError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_encode_too_large() {
        let huge = vec![b'A'; MAX_PAYLOAD_SIZE + 1];
        assert!(matches!(
            encode_frame(&huge),
            Err(ProtocolError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_multiple_frames_in_buffer() {
        let mut buf = encode_frame(b"FIRST").unwrap();
        buf.extend_from_slice(&encode_frame(b"SECOND").unwrap());

        assert_eq!(
            Frame::decode(&mut buf).unwrap().unwrap(),
            Frame::Payload(Bytes::from_static(b"FIRST"))
        );
        assert_eq!(
            Frame::decode(&mut buf).unwrap().unwrap(),
            Frame::Payload(Bytes::from_static(b"SECOND"))
        );
        assert!(Frame::decode(&mut buf).unwrap().is_none());
    }

    proptest! {
        #[test]
        fn prop_roundtrip(payload in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let mut buf = encode_frame(&payload).unwrap();
            let frame = Frame::decode(&mut buf).unwrap().unwrap();
            prop_assert_eq!(frame, Frame::Payload(Bytes::from(payload)));
            prop_assert!(buf.is_empty());
        }
    }
}
