//! Scripted in-memory streams for exercising transports and connections.

use std::collections::VecDeque;
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use tubewire_config::ServerEndpoint;

use crate::connection::Connection;
use crate::transport::Connector;

/// Everything the client sent through streams opened by one connector.
#[derive(Debug, Default)]
pub(crate) struct WireLog {
    pub(crate) written: Vec<u8>,
    pub(crate) write_calls: usize,
    pub(crate) connects: usize,
}

/// Shared view of a connector's [`WireLog`].
#[derive(Debug, Clone, Default)]
pub(crate) struct WireHandle(Arc<Mutex<WireLog>>);

impl WireHandle {
    fn lock(&self) -> MutexGuard<'_, WireLog> {
        self.0.lock().expect("wire log lock")
    }

    pub(crate) fn transcript(&self) -> String {
        String::from_utf8_lossy(&self.lock().written).into_owned()
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.transcript()
            .split("\r\n")
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect()
    }

    pub(crate) fn count(&self, request: &str) -> usize {
        self.requests().iter().filter(|line| *line == request).count()
    }

    pub(crate) fn write_calls(&self) -> usize {
        self.lock().write_calls
    }

    pub(crate) fn connects(&self) -> usize {
        self.lock().connects
    }
}

/// Connector whose streams replay canned server output.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedConnector {
    input: Vec<u8>,
    write_limits: Vec<usize>,
    refuse_with: Option<i32>,
    write_failure: Option<io::ErrorKind>,
    interruptions: usize,
    log: WireHandle,
}

impl ScriptedConnector {
    pub(crate) fn replying(input: impl AsRef<[u8]>) -> Self {
        Self {
            input: input.as_ref().to_vec(),
            ..Self::default()
        }
    }

    pub(crate) fn refusing(code: i32) -> Self {
        Self {
            refuse_with: Some(code),
            ..Self::default()
        }
    }

    /// Caps successive `write` calls at the given sizes.
    pub(crate) fn with_write_limits(mut self, limits: Vec<usize>) -> Self {
        self.write_limits = limits;
        self
    }

    pub(crate) fn failing_writes(mut self, kind: io::ErrorKind) -> Self {
        self.write_failure = Some(kind);
        self
    }

    /// Fails the first `count` writes with `Interrupted`.
    pub(crate) fn interrupted(mut self, count: usize) -> Self {
        self.interruptions = count;
        self
    }

    pub(crate) fn log(&self) -> WireHandle {
        self.log.clone()
    }
}

impl Connector for ScriptedConnector {
    type Stream = ScriptedStream;

    fn connect(&self, _endpoint: &ServerEndpoint) -> io::Result<ScriptedStream> {
        if let Some(code) = self.refuse_with {
            return Err(io::Error::from_raw_os_error(code));
        }
        self.log.lock().connects += 1;
        Ok(ScriptedStream {
            input: Cursor::new(self.input.clone()),
            write_limits: self.write_limits.iter().copied().collect(),
            write_failure: self.write_failure,
            interruptions: self.interruptions,
            log: self.log.clone(),
        })
    }
}

/// In-memory stream produced by [`ScriptedConnector`].
#[derive(Debug)]
pub(crate) struct ScriptedStream {
    input: Cursor<Vec<u8>>,
    write_limits: VecDeque<usize>,
    write_failure: Option<io::ErrorKind>,
    interruptions: usize,
    log: WireHandle,
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut log = self.log.lock();
        log.write_calls += 1;
        if let Some(kind) = self.write_failure {
            return Err(io::Error::new(kind, "scripted write failure"));
        }
        if self.interruptions > 0 {
            self.interruptions -= 1;
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let accepted = self
            .write_limits
            .pop_front()
            .map_or(buf.len(), |limit| limit.min(buf.len()));
        log.written.extend_from_slice(&buf[..accepted]);
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn endpoint(name: &str) -> ServerEndpoint {
    name.parse().expect("valid endpoint")
}

/// A connected connection replaying `input`, with its wire log.
pub(crate) fn connected(
    name: &str,
    input: impl AsRef<[u8]>,
) -> (Connection<ScriptedConnector>, WireHandle) {
    let connector = ScriptedConnector::replying(input);
    let log = connector.log();
    let connection = Connection::open(endpoint(name), connector).expect("scripted connect");
    (connection, log)
}
