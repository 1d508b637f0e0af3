//! Stream factories.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tubewire_config::ServerEndpoint;

/// Opens byte streams to a server endpoint.
pub trait Connector {
    /// Stream type produced by this connector.
    type Stream: Read + Write;

    /// Opens a new stream to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the stream cannot be opened.
    fn connect(&self, endpoint: &ServerEndpoint) -> io::Result<Self::Stream>;
}

/// Connects over TCP, optionally bounding the connect attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpConnector {
    timeout: Option<Duration>,
}

impl TcpConnector {
    /// A connector that waits as long as the operating system allows.
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    /// A connector giving up after `timeout`, or waiting indefinitely for
    /// `None`.
    #[must_use]
    pub const fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, endpoint: &ServerEndpoint) -> io::Result<TcpStream> {
        let stream = match self.timeout {
            Some(timeout) => {
                let address = resolve_tcp_address(endpoint.host(), endpoint.port())?;
                TcpStream::connect_timeout(&address, timeout)?
            }
            None => TcpStream::connect((endpoint.host(), endpoint.port()))?,
        };
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}
