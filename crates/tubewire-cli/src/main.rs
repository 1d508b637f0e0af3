//! CLI entrypoint for the tubewire queue client.
//!
//! The binary delegates to [`tubewire_cli::run`], which loads configuration,
//! connects to the configured servers and prints each command's result as
//! JSON.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    tubewire_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
