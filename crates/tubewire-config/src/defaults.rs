use crate::endpoint::ServerList;
use crate::logging::LogFormat;

/// Host used when no queue server is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Well-known port of the queue protocol.
pub const DEFAULT_PORT: u16 = 11300;

/// Tube every fresh connection uses and watches.
pub const DEFAULT_TUBE: &str = "default";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Servers contacted when none are configured.
pub fn default_servers() -> ServerList {
    ServerList::default()
}

/// Owned default tube name for serde defaults.
pub fn default_tube() -> String {
    DEFAULT_TUBE.to_owned()
}

/// Connect timeout in milliseconds; zero leaves connects unbounded.
pub const fn default_connect_timeout_ms() -> u64 {
    0
}
