//! Command-line runtime for the tubewire queue client.
//!
//! The runtime splits configuration flags from the subcommand, loads the
//! layered configuration, installs telemetry, connects every configured server
//! into a [`Pool`] and prints the subcommand's result as one line of JSON.
//! Configuration loading and the output streams can be substituted in tests.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tubewire::{Connection, Pool, TcpConnector};
use tubewire_config::Config;

mod command;
mod config;
mod errors;
pub mod output;
mod telemetry;

use command::QueueCommand;
use config::{ConfigArgumentSplit, ConfigLoader, OrthoConfigLoader, split_config_arguments};
pub(crate) use errors::AppError;
use output::{CommandOutput, write_output};

const CLI_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runtime");

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `tubewire_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--servers",
    "--tube",
    "--connect-timeout-ms",
    "--log-filter",
    "--log-format",
];

/// Work-queue client.
#[derive(Debug, Parser)]
#[command(name = "tubewire", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: QueueCommand,
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli_arguments = prepare_cli_arguments(&args, &split);

    let result = Cli::try_parse_from(cli_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            loader
                .load(&split.config_arguments)
                .map(|config| (cli, config))
        })
        .and_then(|(cli, config)| execute(&cli, &config))
        .and_then(|output| write_output(stdout, &output));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    let mut cli_arguments: Vec<OsString> = args.first().cloned().into_iter().collect();
    cli_arguments.extend(args.iter().skip(split.command_start).cloned());
    cli_arguments
}

fn execute(cli: &Cli, config: &Config) -> Result<CommandOutput, AppError> {
    telemetry::initialise(config)?;
    let pool = connect_pool(config)?;
    Ok(cli.command.execute(&pool, config.tube())?)
}

fn connect_pool(config: &Config) -> Result<Pool, AppError> {
    let connector = TcpConnector::with_timeout(config.connect_timeout());
    let mut connections = Vec::new();
    for endpoint in config.servers().endpoints() {
        debug!(target: CLI_TARGET, server = %endpoint, "connecting");
        let connection =
            Connection::open(endpoint.clone(), connector).map_err(|source| AppError::Connect {
                server: endpoint.to_string(),
                source,
            })?;
        connections.push(connection);
    }
    Ok(Pool::new(connections)?)
}
