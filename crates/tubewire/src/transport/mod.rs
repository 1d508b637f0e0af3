//! Byte stream to a single queue server.
//!
//! The protocol is line oriented: every response starts with a CRLF
//! terminated status line, optionally followed by a body of a declared length
//! and another CRLF. [`Transport`] provides exactly those primitives on top of
//! a stream produced by a [`Connector`].

mod connector;

use std::io::{self, BufRead, BufReader, Read, Write};

use tracing::warn;
use tubewire_config::ServerEndpoint;

pub use connector::{Connector, TcpConnector};

use crate::error::TransportError;

/// Longest accepted response line, terminator included.
pub const MAX_LINE_BYTES: usize = 1024;

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// A connectable byte stream to one server.
pub struct Transport<C: Connector = TcpConnector> {
    endpoint: ServerEndpoint,
    identity: String,
    connector: C,
    stream: Option<BufReader<C::Stream>>,
}

impl<C: Connector> Transport<C> {
    /// Creates a disconnected transport for `endpoint`.
    #[must_use]
    pub fn new(endpoint: ServerEndpoint, connector: C) -> Self {
        let identity = endpoint.to_string();
        Self {
            endpoint,
            identity,
            connector,
            stream: None,
        }
    }

    /// Server endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    /// Server identity, `host:port`.
    #[must_use]
    pub fn identity(&self) -> &str {
        self.identity.as_str()
    }

    /// Whether a stream is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Opens a stream, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] with the OS error code and message
    /// when the connector fails; the transport is then disconnected.
    pub fn connect(&mut self) -> Result<(), TransportError> {
        self.stream = None;
        let stream = self
            .connector
            .connect(&self.endpoint)
            .map_err(|source| TransportError::connect(&self.identity, source))?;
        self.stream = Some(BufReader::new(stream));
        Ok(())
    }

    /// Drops the stream.
    pub fn close(&mut self) {
        self.stream = None;
    }

    fn not_connected(&self) -> TransportError {
        TransportError::NotConnected {
            server: self.identity.clone(),
        }
    }

    fn fail(&mut self, error: TransportError) -> TransportError {
        warn!(
            target: TRANSPORT_TARGET,
            server = %self.identity,
            error = %error,
            "closing transport after failure"
        );
        self.close();
        error
    }

    /// Writes the whole of `data`, returning the number of bytes sent.
    ///
    /// Partial writes are continued until the buffer is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] before [`Transport::connect`],
    /// or [`TransportError::Write`] when the stream fails; the transport is
    /// closed in the latter case.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let Some(reader) = self.stream.as_mut() else {
            return Err(self.not_connected());
        };
        match write_fully(reader.get_mut(), data) {
            Ok(written) => Ok(written),
            Err(source) => {
                let error = TransportError::write(&self.identity, source);
                Err(self.fail(error))
            }
        }
    }

    /// Reads one status line and strips its CRLF terminator.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] at end of stream,
    /// [`TransportError::LineTooLong`] past [`MAX_LINE_BYTES`],
    /// [`TransportError::MissingTerminator`] for a bare LF and
    /// [`TransportError::Read`] for stream failures. Every failure closes the
    /// transport.
    pub fn read_line(&mut self) -> Result<String, TransportError> {
        let Some(reader) = self.stream.as_mut() else {
            return Err(self.not_connected());
        };

        let mut buffer = Vec::new();
        let outcome = read_bounded_line(reader, &mut buffer);
        let error = match outcome {
            Ok(()) => match line_from(buffer) {
                Ok(line) => return Ok(line),
                Err(LineFault::TooLong) => TransportError::LineTooLong {
                    server: self.identity.clone(),
                    limit: MAX_LINE_BYTES,
                },
                Err(LineFault::Closed) => TransportError::Closed {
                    server: self.identity.clone(),
                },
                Err(LineFault::Unterminated) => TransportError::MissingTerminator {
                    server: self.identity.clone(),
                },
                Err(LineFault::Encoding) => TransportError::InvalidEncoding {
                    server: self.identity.clone(),
                },
            },
            Err(source) => TransportError::read(&self.identity, source),
        };
        Err(self.fail(error))
    }

    /// Reads a body of exactly `length` bytes and its CRLF terminator.
    ///
    /// The buffer grows with the bytes actually received, never with the
    /// declared length alone.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] when the stream ends early,
    /// [`TransportError::MissingTerminator`] when the body is not followed by
    /// CRLF and [`TransportError::Read`] for stream failures. Every failure
    /// closes the transport.
    pub fn read_body(&mut self, length: usize) -> Result<Vec<u8>, TransportError> {
        let Some(reader) = self.stream.as_mut() else {
            return Err(self.not_connected());
        };

        let framed = length.saturating_add(2);
        let limit = u64::try_from(length).unwrap_or(u64::MAX).saturating_add(2);
        let mut body = Vec::new();
        let error = match reader.take(limit).read_to_end(&mut body) {
            Ok(read) if read < framed => TransportError::Closed {
                server: self.identity.clone(),
            },
            Ok(_) if body.ends_with(b"\r\n") => {
                body.truncate(length);
                return Ok(body);
            }
            Ok(_) => TransportError::MissingTerminator {
                server: self.identity.clone(),
            },
            Err(source) => TransportError::read(&self.identity, source),
        };
        Err(self.fail(error))
    }
}

fn write_fully<W: Write>(writer: &mut W, data: &[u8]) -> io::Result<usize> {
    let mut written = 0;
    while let Some(remaining) = data.get(written..).filter(|rest| !rest.is_empty()) {
        match writer.write(remaining) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "stream accepted no bytes",
                ));
            }
            Ok(count) => written += count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
    writer.flush()?;
    Ok(written)
}

fn read_bounded_line<R: BufRead>(reader: &mut R, buffer: &mut Vec<u8>) -> io::Result<()> {
    let limit = u64::try_from(MAX_LINE_BYTES).unwrap_or(u64::MAX);
    reader.take(limit).read_until(b'\n', buffer)?;
    Ok(())
}

enum LineFault {
    Closed,
    TooLong,
    Unterminated,
    Encoding,
}

fn line_from(mut buffer: Vec<u8>) -> Result<String, LineFault> {
    if buffer.is_empty() {
        return Err(LineFault::Closed);
    }
    if !buffer.ends_with(b"\n") {
        return Err(if buffer.len() >= MAX_LINE_BYTES {
            LineFault::TooLong
        } else {
            LineFault::Closed
        });
    }
    if !buffer.ends_with(b"\r\n") {
        return Err(LineFault::Unterminated);
    }
    buffer.truncate(buffer.len() - 2);
    String::from_utf8(buffer).map_err(|_| LineFault::Encoding)
}

#[cfg(test)]
mod tests;
