//! Integration tests for the `tubewire` binary entry point.
//!
//! Verifies help output, usage failures and error reporting when no queue
//! server is reachable.

use std::net::TcpListener;

use anyhow::{Context, Result};
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn help_lists_subcommands() {
    let mut command = cargo_bin_cmd!("tubewire");
    command.arg("--help");
    command
        .assert()
        .success()
        .stdout(contains("peek-ready"))
        .stdout(contains("stats-tube"));
}

#[test]
fn unknown_subcommand_exits_with_failure() {
    let mut command = cargo_bin_cmd!("tubewire");
    command.arg("bury-everything");
    command
        .assert()
        .failure()
        .stderr(contains("unrecognized subcommand"));
}

#[test]
fn unreachable_server_exits_with_failure() -> Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind probe")?;
    let server = listener.local_addr().context("probe addr")?.to_string();
    drop(listener);

    let mut command = cargo_bin_cmd!("tubewire");
    command.args(["--servers", server.as_str(), "stats"]);
    command
        .assert()
        .failure()
        .stderr(contains(format!("failed to connect to {server}")));
    Ok(())
}
