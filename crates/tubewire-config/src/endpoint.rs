use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::DEFAULT_PORT;

/// Network address of a single queue server.
///
/// The textual form `host:port` doubles as the server's identity: pools key
/// their members by it and every diagnostic names the server this way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerEndpoint {
    host: String,
    port: u16,
}

impl ServerEndpoint {
    /// Builds an endpoint from a host name and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name or address literal.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(formatter, "[{}]:{}", self.host, self.port)
        } else {
            write!(formatter, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for ServerEndpoint {
    type Err = EndpointParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EndpointParseError::Empty);
        }

        let (host, port) = split_host_port(trimmed)?;
        if host.is_empty() {
            return Err(EndpointParseError::MissingHost(trimmed.to_owned()));
        }
        let port_number = match port {
            Some(text) => text
                .parse::<u16>()
                .map_err(|source| EndpointParseError::InvalidPort {
                    input: trimmed.to_owned(),
                    source,
                })?,
            None => DEFAULT_PORT,
        };
        Ok(Self::new(host, port_number))
    }
}

fn split_host_port(input: &str) -> Result<(&str, Option<&str>), EndpointParseError> {
    if let Some(rest) = input.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| EndpointParseError::MissingHost(input.to_owned()))?;
        return match tail.strip_prefix(':') {
            Some(port) => Ok((host, Some(port))),
            None if tail.is_empty() => Ok((host, None)),
            None => Err(EndpointParseError::MissingHost(input.to_owned())),
        };
    }

    match input.rsplit_once(':') {
        Some((host, _)) if host.contains(':') => Ok((input, None)),
        Some((host, port)) => Ok((host, Some(port))),
        None => Ok((input, None)),
    }
}

impl TryFrom<String> for ServerEndpoint {
    type Error = EndpointParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServerEndpoint> for String {
    fn from(endpoint: ServerEndpoint) -> Self {
        endpoint.to_string()
    }
}

/// Ordered set of queue servers a client spreads its connections over.
///
/// Parses from a comma-separated list (`a:11300,b:11300`) so the same value
/// works from the command line, environment variables and configuration
/// files. Files may also use a TOML array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "Vec<ServerEndpoint>")]
pub struct ServerList(Vec<ServerEndpoint>);

impl ServerList {
    /// Builds a list from endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointParseError::Empty`] when no endpoints are supplied.
    pub fn new(endpoints: Vec<ServerEndpoint>) -> Result<Self, EndpointParseError> {
        if endpoints.is_empty() {
            return Err(EndpointParseError::Empty);
        }
        Ok(Self(endpoints))
    }

    /// The configured endpoints in declaration order.
    #[must_use]
    pub fn endpoints(&self) -> &[ServerEndpoint] {
        &self.0
    }
}

impl Default for ServerList {
    fn default() -> Self {
        Self(vec![ServerEndpoint::default()])
    }
}

impl fmt::Display for ServerList {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for endpoint in &self.0 {
            if !first {
                formatter.write_str(",")?;
            }
            write!(formatter, "{endpoint}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for ServerList {
    type Err = EndpointParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let endpoints = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<ServerEndpoint>, _>>()?;
        Self::new(endpoints)
    }
}

impl From<ServerList> for Vec<ServerEndpoint> {
    fn from(list: ServerList) -> Self {
        list.0
    }
}

impl<'de> Deserialize<'de> for ServerList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Joined(String),
            Listed(Vec<ServerEndpoint>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Joined(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Listed(endpoints) => Self::new(endpoints).map_err(serde::de::Error::custom),
        }
    }
}

/// Errors encountered while parsing a [`ServerEndpoint`] or [`ServerList`].
#[derive(Debug, Error)]
pub enum EndpointParseError {
    /// No endpoint text was supplied.
    #[error("at least one server endpoint is required")]
    Empty,
    /// The host portion was empty or malformed.
    #[error("missing server host in '{0}'")]
    MissingHost(String),
    /// The port was not a valid 16-bit number.
    #[error("invalid server port in '{input}': {source}")]
    InvalidPort {
        /// Offending endpoint text.
        input: String,
        /// Underlying integer parse failure.
        #[source]
        source: ParseIntError,
    },
}
