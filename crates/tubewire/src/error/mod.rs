//! Error taxonomy for the queue client.
//!
//! [`ClientError`] is the single error type returned by the engine. It keeps
//! the failure classes apart so callers can match on them: protocol refusals
//! from the server ([`ProtocolError`]), socket failures ([`TransportError`]),
//! local validation ([`NameError`], [`ClientError::InvalidArgument`]) and
//! context reconciliation refusals ([`ContextError`]). I/O errors are wrapped
//! in `Arc` so the enums stay cheap to clone.

use std::fmt;
use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::name::TubeName;

/// Classification of a failure reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolErrorKind {
    /// The server could not parse the request (`BAD_FORMAT`).
    BadFormat,
    /// The server hit an internal fault (`INTERNAL_ERROR`).
    InternalError,
    /// The server could not allocate memory (`OUT_OF_MEMORY`).
    OutOfMemory,
    /// The server does not know the command (`UNKNOWN_COMMAND`).
    UnknownCommand,
    /// The job or tube does not exist (`NOT_FOUND`).
    NotFound,
    /// The job was buried instead of stored or released (`BURIED`).
    Buried,
    /// The job body was not followed by CRLF (`EXPECTED_CRLF`).
    ExpectedCrlf,
    /// The job body exceeds the server limit (`JOB_TOO_BIG`).
    JobTooBig,
    /// The server is draining and refuses new jobs (`DRAINING`).
    Draining,
    /// A reserved job's time-to-run is about to expire (`DEADLINE_SOON`).
    DeadlineSoon,
    /// A timed reserve expired without a job (`TIMED_OUT`).
    Timeout,
    /// The last watched tube cannot be ignored (`NOT_IGNORED`).
    NotIgnored,
    /// The response did not match anything the command expects.
    UnexpectedResponse,
}

impl ProtocolErrorKind {
    /// Maps a status token shared by every command to its kind.
    #[must_use]
    pub fn universal(token: &str) -> Option<Self> {
        match token {
            "BAD_FORMAT" => Some(Self::BadFormat),
            "INTERNAL_ERROR" => Some(Self::InternalError),
            "OUT_OF_MEMORY" => Some(Self::OutOfMemory),
            "UNKNOWN_COMMAND" => Some(Self::UnknownCommand),
            _ => None,
        }
    }

    /// Whether any command may receive this failure.
    #[must_use]
    pub const fn is_universal(self) -> bool {
        matches!(
            self,
            Self::BadFormat | Self::InternalError | Self::OutOfMemory | Self::UnknownCommand
        )
    }

    /// Short human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::BadFormat => "bad request format",
            Self::InternalError => "internal server error",
            Self::OutOfMemory => "server out of memory",
            Self::UnknownCommand => "unknown command",
            Self::NotFound => "not found",
            Self::Buried => "job buried",
            Self::ExpectedCrlf => "job body not terminated by CRLF",
            Self::JobTooBig => "job too big",
            Self::Draining => "server draining",
            Self::DeadlineSoon => "reserved job deadline soon",
            Self::Timeout => "timed out",
            Self::NotIgnored => "cannot ignore the only watched tube",
            Self::UnexpectedResponse => "unexpected response",
        }
    }
}

impl fmt::Display for ProtocolErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.description())
    }
}

/// A failure reported by the server in answer to a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} for '{command}' on {server} (response {response:?})")]
pub struct ProtocolError {
    kind: ProtocolErrorKind,
    command: String,
    server: String,
    response: String,
}

impl ProtocolError {
    /// Builds an error bound to the command line, server and response line.
    #[must_use]
    pub fn new(
        kind: ProtocolErrorKind,
        command: impl Into<String>,
        server: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            command: command.into(),
            server: server.into(),
            response: response.into(),
        }
    }

    /// Failure classification.
    #[must_use]
    pub const fn kind(&self) -> ProtocolErrorKind {
        self.kind
    }

    /// Command line that provoked the failure.
    #[must_use]
    pub fn command(&self) -> &str {
        self.command.as_str()
    }

    /// Identity of the server that answered.
    #[must_use]
    pub fn server(&self) -> &str {
        self.server.as_str()
    }

    /// Literal response line.
    #[must_use]
    pub fn response(&self) -> &str {
        self.response.as_str()
    }
}

/// Socket-level failures.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// An operation was attempted before connecting.
    #[error("not connected to {server}")]
    NotConnected {
        /// Server identity.
        server: String,
    },

    /// The connection could not be established.
    #[error("failed to connect to {server} (os error code {code:?}): {source}")]
    Connect {
        /// Server identity.
        server: String,
        /// Operating system error code, when one was reported.
        code: Option<i32>,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Writing a request failed.
    #[error("failed to write to {server} (os error code {code:?}): {source}")]
    Write {
        /// Server identity.
        server: String,
        /// Operating system error code, when one was reported.
        code: Option<i32>,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Reading a response failed.
    #[error("failed to read from {server} (os error code {code:?}): {source}")]
    Read {
        /// Server identity.
        server: String,
        /// Operating system error code, when one was reported.
        code: Option<i32>,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The server closed the connection mid-exchange.
    #[error("connection to {server} closed by peer")]
    Closed {
        /// Server identity.
        server: String,
    },

    /// A response line exceeded the accepted length.
    #[error("response line from {server} exceeds {limit} bytes")]
    LineTooLong {
        /// Server identity.
        server: String,
        /// Maximum accepted line length in bytes.
        limit: usize,
    },

    /// A response line or body was not terminated by CRLF.
    #[error("response from {server} is missing its CRLF terminator")]
    MissingTerminator {
        /// Server identity.
        server: String,
    },

    /// A response line was not valid UTF-8.
    #[error("response line from {server} is not valid UTF-8")]
    InvalidEncoding {
        /// Server identity.
        server: String,
    },
}

impl TransportError {
    pub(crate) fn connect(server: &str, source: io::Error) -> Self {
        Self::Connect {
            server: server.to_owned(),
            code: source.raw_os_error(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn write(server: &str, source: io::Error) -> Self {
        Self::Write {
            server: server.to_owned(),
            code: source.raw_os_error(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn read(server: &str, source: io::Error) -> Self {
        Self::Read {
            server: server.to_owned(),
            code: source.raw_os_error(),
            source: Arc::new(source),
        }
    }

    /// Operating system error code carried by connect, write and read failures.
    #[must_use]
    pub const fn os_code(&self) -> Option<i32> {
        match self {
            Self::Connect { code, .. } | Self::Write { code, .. } | Self::Read { code, .. } => {
                *code
            }
            _ => None,
        }
    }
}

/// Tube name grammar violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name was empty.
    #[error("tube name must not be empty")]
    Empty,

    /// The name exceeded the length limit.
    #[error("tube name is {length} bytes long; the limit is 200")]
    TooLong {
        /// Length of the rejected name in bytes.
        length: usize,
    },

    /// The name started with a hyphen.
    #[error("tube name '{name}' must not start with '-'")]
    LeadingHyphen {
        /// Rejected name.
        name: String,
    },

    /// The name contained a character outside the grammar.
    #[error("tube name '{name}' contains forbidden character {character:?}")]
    InvalidCharacter {
        /// Rejected name.
        name: String,
        /// First offending character.
        character: char,
    },
}

/// Refusals raised while planning or applying tube context changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// A context must watch at least one tube.
    #[error("a tube context must watch at least one tube")]
    EmptyWatchList,

    /// Ignoring the tube would leave nothing watched.
    #[error("cannot ignore '{tube}': it is the last watched tube")]
    LastWatchedTube {
        /// Tube that was to be ignored.
        tube: TubeName,
    },
}

/// Failures decoding a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BodyError {
    /// The body was not UTF-8 text.
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The body was not the expected YAML shape.
    #[error("response body is not a valid YAML {expected}: {message}")]
    Yaml {
        /// Shape the decoder expected.
        expected: &'static str,
        /// Parser diagnostic.
        message: String,
    },
}

/// Errors returned by connections, pools and facades.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The server refused the command or answered unexpectedly.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The socket failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A tube name broke the grammar.
    #[error(transparent)]
    InvalidName(#[from] NameError),

    /// A command argument was rejected before any I/O.
    #[error("invalid {argument}: {reason}")]
    InvalidArgument {
        /// Argument name.
        argument: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A tube context change was refused.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// A response body could not be decoded.
    #[error("failed to decode response from {server}: {source}")]
    Decode {
        /// Server identity.
        server: String,
        /// Decoder failure.
        #[source]
        source: BodyError,
    },

    /// A response carried a payload of the wrong shape for the caller.
    #[error("response from {server} did not carry {expected}")]
    UnexpectedPayload {
        /// Server identity.
        server: String,
        /// Payload shape the caller needed.
        expected: &'static str,
    },

    /// A pool was built without connections.
    #[error("a pool needs at least one connection")]
    EmptyPool,

    /// No pool member has the requested identity.
    #[error("server '{name}' is not part of the pool")]
    ServerNotFound {
        /// Identity that was looked up.
        name: String,
    },

    /// A connection lock was poisoned by a panicking holder.
    #[error("connection to {server} is unusable after a panic")]
    ConnectionPoisoned {
        /// Server identity.
        server: String,
    },

    /// The pool's tube context lock was poisoned by a panicking holder.
    #[error("pool tube context is unusable after a panic")]
    ContextPoisoned,
}

impl ClientError {
    /// Protocol failure kind, when this is a protocol error.
    #[must_use]
    pub const fn protocol_kind(&self) -> Option<ProtocolErrorKind> {
        match self {
            Self::Protocol(error) => Some(error.kind()),
            _ => None,
        }
    }

    /// Whether the server answered `NOT_FOUND`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.protocol_kind() == Some(ProtocolErrorKind::NotFound)
    }
}
