//! Shared configuration for the tubewire client and command-line tool.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then a
//! configuration file (discovered or passed with `--config-path`), then
//! `TUBEWIRE_*` environment variables, then command-line flags. The resulting
//! [`Config`] names the queue servers to connect to, the tube commands operate
//! on, and how the binaries log.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod endpoint;
mod logging;

pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT, DEFAULT_TUBE, default_connect_timeout_ms,
    default_log_filter, default_log_filter_string, default_log_format, default_servers,
    default_tube,
};
pub use endpoint::{EndpointParseError, ServerEndpoint, ServerList};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TUBEWIRE")]
pub struct Config {
    /// Queue servers, as a comma-separated `host:port` list.
    #[serde(default = "default_servers")]
    #[ortho_config(default = default_servers())]
    pub servers: ServerList,
    /// Tube that produce and consume commands operate on.
    #[serde(default = "default_tube")]
    #[ortho_config(default = default_tube())]
    pub tube: String,
    /// Connect timeout in milliseconds; zero waits for the OS.
    #[serde(default = "default_connect_timeout_ms")]
    #[ortho_config(default = default_connect_timeout_ms())]
    pub connect_timeout_ms: u64,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            tube: default_tube(),
            connect_timeout_ms: default_connect_timeout_ms(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Queue servers to connect to.
    #[must_use]
    pub fn servers(&self) -> &ServerList {
        &self.servers
    }

    /// Tube name used by tube-scoped commands.
    #[must_use]
    pub fn tube(&self) -> &str {
        self.tube.as_str()
    }

    /// Connect timeout, or `None` when connects are unbounded.
    #[must_use]
    pub const fn connect_timeout(&self) -> Option<Duration> {
        match self.connect_timeout_ms {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
