//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tubewire::ClientError;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to connect to {server}: {source}")]
    Connect { server: String, source: ClientError },
    #[error("{0}")]
    Client(#[from] ClientError),
    #[error("failed to serialise command output: {0}")]
    SerialiseOutput(serde_json::Error),
    #[error("failed to write command output: {0}")]
    EmitOutput(io::Error),
}
