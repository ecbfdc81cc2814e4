//! Accumulating frame decoder.
//!
//! TCP delivers bytes in arbitrary chunks, so both sides feed whatever
//! they read into a [`Decoder`] and ask it for complete frames. The
//! decoder never interprets payload bytes before the full header is in
//! hand and never consumes past the declared payload length.

use crate::error::ProtocolError;
use crate::frame::Frame;
use bytes::BytesMut;

/// Decodes frames from an incrementally filled buffer.
pub struct Decoder {
    buffer: BytesMut,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next frame from the buffer.
    pub fn decode(&mut self) -> Result<Option<Frame>, ProtocolError> {
        Frame::decode(&mut self.buffer)
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;
    use bytes::Bytes;
    use proptest::prelude::*;

    #[test]
    fn test_decode_whole_frame() {
        let encoded = encode_frame(b"PAYLOAD").unwrap();

        let mut decoder = Decoder::new();
        decoder.extend(&encoded);

        let frame = decoder.decode().unwrap().unwrap();
        assert_eq!(frame, Frame::Payload(Bytes::from_static(b"PAYLOAD")));
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_decode_one_byte_at_a_time() {
        let encoded = encode_frame(b"DRIP FED").unwrap();

        let mut decoder = Decoder::new();
        for (i, byte) in encoded.iter().enumerate() {
            decoder.extend(std::slice::from_ref(byte));
            let decoded = decoder.decode().unwrap();
            if i < encoded.len() - 1 {
                assert!(decoded.is_none(), "frame complete after {} bytes", i + 1);
            } else {
                assert_eq!(decoded, Some(Frame::Payload(Bytes::from_static(b"DRIP FED"))));
            }
        }
    }

    #[test]
    fn test_decode_split_across_header_boundary() {
        let encoded = encode_frame(b"XY").unwrap();

        let mut decoder = Decoder::new();
        decoder.extend(&encoded[..5]);
        assert!(decoder.decode().unwrap().is_none());

        decoder.extend(&encoded[5..]);
        let frame = decoder.decode().unwrap().unwrap();
        assert_eq!(frame, Frame::Payload(Bytes::from_static(b"XY")));
    }

    #[test]
    fn test_decoder_default() {
        let mut decoder = Decoder::default();
        assert_eq!(decoder.buffered(), 0);
        assert!(decoder.decode().unwrap().is_none());
    }

    proptest! {
        #[test]
        fn prop_roundtrip_under_arbitrary_chunking(
            payload in proptest::collection::vec(any::<u8>(), 0..2048),
            chunk in 1usize..64,
        ) {
            let encoded = encode_frame(&payload).unwrap();

            let mut decoder = Decoder::new();
            let mut decoded = None;
            for piece in encoded.chunks(chunk) {
                decoder.extend(piece);
                if let Some(frame) = decoder.decode().unwrap() {
                    prop_assert!(decoded.is_none());
                    decoded = Some(frame);
                }
            }
            prop_assert_eq!(decoded, Some(Frame::Payload(Bytes::from(payload))));
        }
    }
}
