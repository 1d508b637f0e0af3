//! Successful server responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Success status token of a response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// A job was stored.
    Inserted,
    /// A job was buried.
    Buried,
    /// The connection now uses a tube.
    Using,
    /// A job was reserved.
    Reserved,
    /// A job was deleted.
    Deleted,
    /// A job was released.
    Released,
    /// A job's time-to-run was extended.
    Touched,
    /// The watch list changed.
    Watching,
    /// A peeked job was found.
    Found,
    /// Jobs were kicked.
    Kicked,
    /// A data body follows.
    Ok,
    /// A tube was paused.
    Paused,
    /// The connection was closed by `quit`.
    Closed,
}

/// Inline scalar carried on a response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// A numeric argument such as a job id or count.
    Number(u64),
    /// A textual argument such as a tube name.
    Text(String),
}

/// A value in a statistics mapping.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer counter.
    Integer(i64),
    /// A fractional measurement.
    Float(f64),
    /// Anything else, kept as text.
    Text(String),
}

/// Data carried by a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No data.
    None,
    /// An undecoded body.
    Bytes(Vec<u8>),
    /// A single inline argument.
    Scalar(Scalar),
    /// A job id with its body.
    Job {
        /// Job id.
        id: u64,
        /// Job body bytes.
        data: Vec<u8>,
    },
    /// A decoded list body.
    List(Vec<String>),
    /// A decoded mapping body.
    Map(BTreeMap<String, StatValue>),
}

/// The outcome of one successful exchange with a server.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: Status,
    payload: Payload,
    server: String,
}

impl Response {
    /// Builds a response attributed to `server`.
    #[must_use]
    pub fn new(status: Status, payload: Payload, server: impl Into<String>) -> Self {
        Self {
            status,
            payload,
            server: server.into(),
        }
    }

    /// Success status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Response data.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Identity of the server that answered.
    #[must_use]
    pub fn server(&self) -> &str {
        self.server.as_str()
    }

    /// Consumes the response, returning its data.
    #[must_use]
    pub fn into_payload(self) -> Payload {
        self.payload
    }

    /// The inline numeric argument, if any.
    #[must_use]
    pub const fn number(&self) -> Option<u64> {
        match self.payload {
            Payload::Scalar(Scalar::Number(value)) => Some(value),
            _ => None,
        }
    }

    /// The inline textual argument, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Scalar(Scalar::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }
}
