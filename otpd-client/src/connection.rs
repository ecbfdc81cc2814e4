//! Connection management.
//!
//! A connection performs exactly one request/response exchange and is
//! then spent: send the tagged request frame, read frames until the
//! response is complete, surface the plaintext or the rejection.

use crate::error::ClientError;
use crate::input::PadInput;
use otpd_protocol::{encode_frame, Decoder, DecryptRequest, Frame};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Default read buffer size (8 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Minimum read buffer size (1 KiB).
pub const MIN_READ_BUFFER_SIZE: usize = 1024;

/// Maximum read buffer size (1 MiB).
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address.
    pub addr: SocketAddr,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout (covers the whole exchange).
    pub request_timeout: Duration,
    /// Read buffer size for socket reads.
    pub read_buffer_size: usize,
}

impl ClientConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.clamp(MIN_READ_BUFFER_SIZE, MAX_READ_BUFFER_SIZE);
        self
    }
}

/// A connection to an otpd server.
pub struct Connection {
    config: ClientConfig,
    stream: TcpStream,
}

impl Connection {
    /// Connects to the server.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        tracing::debug!("Connecting to {}...", config.addr);

        let stream =
            tokio::time::timeout(config.connect_timeout, TcpStream::connect(config.addr))
                .await
                .map_err(|_| ClientError::Timeout)?
                .map_err(ClientError::Io)?;
        stream.set_nodelay(true).ok();

        tracing::debug!("Connected to {}", config.addr);
        Ok(Self { config, stream })
    }

    /// Performs the decrypt exchange: one request frame out, one response
    /// frame back. Consumes the connection; the protocol is strictly one
    /// exchange per connection.
    pub async fn decrypt(mut self, input: &PadInput) -> Result<String, ClientError> {
        let timeout = self.config.request_timeout;
        tokio::time::timeout(timeout, self.exchange(input))
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    async fn exchange(&mut self, input: &PadInput) -> Result<String, ClientError> {
        let request = DecryptRequest::new(input.ciphertext.as_str(), input.key.as_str());
        let encoded = encode_frame(&request.encode())?;

        tracing::debug!("Sending request frame ({} bytes)", encoded.len());
        self.stream.write_all(&encoded).await?;

        let frame = self.read_frame().await?;
        match frame {
            Frame::Rejected => {
                tracing::debug!("Server sent the rejection sentinel");
                Err(ClientError::Rejected)
            }
            Frame::Payload(payload) => {
                let plaintext = std::str::from_utf8(&payload)
                    .map_err(|_| ClientError::InvalidResponse)?
                    .to_string();
                tracing::debug!("Received plaintext ({} bytes)", plaintext.len());
                Ok(plaintext)
            }
        }
    }

    /// Reads from the socket until one complete frame is decoded.
    async fn read_frame(&mut self) -> Result<Frame, ClientError> {
        let mut decoder = Decoder::new();
        let mut buf = vec![0u8; self.config.read_buffer_size];

        loop {
            let n = self.stream.read(&mut buf).await?;
            if n == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            tracing::trace!("Read {} bytes from socket", n);

            decoder.extend(&buf[..n]);
            if let Some(frame) = decoder.decode()? {
                return Ok(frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("127.0.0.1:57101".parse().unwrap());
        assert_eq!(config.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_buffer_clamping() {
        let config =
            ClientConfig::new("127.0.0.1:57101".parse().unwrap()).with_read_buffer_size(100);
        assert_eq!(config.read_buffer_size, MIN_READ_BUFFER_SIZE);

        let config = ClientConfig::new("127.0.0.1:57101".parse().unwrap())
            .with_read_buffer_size(10 * 1024 * 1024);
        assert_eq!(config.read_buffer_size, MAX_READ_BUFFER_SIZE);
    }
}
