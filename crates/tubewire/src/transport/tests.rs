//! Unit tests for the transport primitives.

use std::io;

use rstest::rstest;

use super::*;
use crate::test_support::{ScriptedConnector, endpoint};

fn transport(connector: ScriptedConnector) -> Transport<ScriptedConnector> {
    Transport::new(endpoint("queue.local:11300"), connector)
}

fn connected(input: &[u8]) -> Transport<ScriptedConnector> {
    let mut transport = transport(ScriptedConnector::replying(input));
    transport.connect().expect("scripted connect");
    transport
}

#[test]
fn identity_is_host_and_port() {
    let transport = transport(ScriptedConnector::default());
    assert_eq!(transport.identity(), "queue.local:11300");
    assert!(!transport.is_connected());
}

#[test]
fn write_before_connect_fails_fast() {
    let connector = ScriptedConnector::default();
    let log = connector.log();
    let mut transport = transport(connector);

    let error = transport.write(b"stats\r\n").expect_err("not connected");

    assert!(matches!(error, TransportError::NotConnected { ref server } if server == "queue.local:11300"));
    assert_eq!(log.write_calls(), 0);
}

#[test]
fn read_before_connect_fails_fast() {
    let mut transport = transport(ScriptedConnector::default());
    assert!(matches!(
        transport.read_line(),
        Err(TransportError::NotConnected { .. })
    ));
}

#[test]
fn connect_failure_carries_os_code() {
    let mut transport = transport(ScriptedConnector::refusing(111));

    let error = transport.connect().expect_err("refused");

    assert!(matches!(error, TransportError::Connect { code: Some(111), .. }));
    assert!(!transport.is_connected());
}

#[test]
fn partial_writes_are_continued_until_complete() {
    let connector = ScriptedConnector::replying(b"").with_write_limits(vec![4, 6]);
    let log = connector.log();
    let mut transport = transport(connector);
    transport.connect().expect("scripted connect");

    let written = transport.write(b"0123456789").expect("write");

    assert_eq!(written, 10);
    assert_eq!(log.write_calls(), 2);
    assert_eq!(log.transcript(), "0123456789");
}

#[test]
fn zero_length_write_is_a_failure() {
    let connector = ScriptedConnector::replying(b"").with_write_limits(vec![0]);
    let mut transport = transport(connector);
    transport.connect().expect("scripted connect");

    let error = transport.write(b"stats\r\n").expect_err("zero write");

    assert!(matches!(error, TransportError::Write { .. }));
    assert!(!transport.is_connected());
}

#[test]
fn write_failure_closes_transport() {
    let connector = ScriptedConnector::replying(b"").failing_writes(io::ErrorKind::BrokenPipe);
    let mut transport = transport(connector);
    transport.connect().expect("scripted connect");

    let error = transport.write(b"stats\r\n").expect_err("broken pipe");

    assert!(matches!(error, TransportError::Write { .. }));
    assert!(!transport.is_connected());
}

#[test]
fn interrupted_writes_are_retried() {
    let connector = ScriptedConnector::replying(b"").interrupted(2);
    let log = connector.log();
    let mut transport = transport(connector);
    transport.connect().expect("scripted connect");

    let written = transport.write(b"stats\r\n").expect("write after interruptions");

    assert_eq!(written, 7);
    assert_eq!(log.write_calls(), 3);
    assert_eq!(log.transcript(), "stats\r\n");
    assert!(transport.is_connected());
}

#[test]
fn reads_lines_and_strips_terminator() {
    let mut transport = connected(b"USING jobs\r\nINSERTED 7\r\n");
    assert_eq!(transport.read_line().expect("first line"), "USING jobs");
    assert_eq!(transport.read_line().expect("second line"), "INSERTED 7");
}

#[rstest]
#[case(b"".as_slice())]
#[case(b"INSERT".as_slice())]
fn eof_reports_closed(#[case] input: &[u8]) {
    let mut transport = connected(input);
    assert!(matches!(
        transport.read_line(),
        Err(TransportError::Closed { .. })
    ));
    assert!(!transport.is_connected());
}

#[test]
fn bare_newline_is_missing_terminator() {
    let mut transport = connected(b"DELETED\n");
    assert!(matches!(
        transport.read_line(),
        Err(TransportError::MissingTerminator { .. })
    ));
}

#[test]
fn overlong_line_is_rejected() {
    let input = vec![b'A'; MAX_LINE_BYTES + 10];
    let mut transport = connected(&input);
    assert!(matches!(
        transport.read_line(),
        Err(TransportError::LineTooLong { limit: MAX_LINE_BYTES, .. })
    ));
}

#[test]
fn reads_body_of_declared_length() {
    let mut transport = connected(b"FOUND 1 5\r\nhel\r\n\r\nNEXT\r\n");
    assert_eq!(transport.read_line().expect("status"), "FOUND 1 5");
    assert_eq!(transport.read_body(5).expect("body"), b"hel\r\n".to_vec());
    assert_eq!(transport.read_line().expect("next"), "NEXT");
}

#[test]
fn body_without_terminator_is_rejected() {
    let mut transport = connected(b"helloXX");
    assert!(matches!(
        transport.read_body(5),
        Err(TransportError::MissingTerminator { .. })
    ));
}

#[test]
fn short_body_reports_closed() {
    let mut transport = connected(b"hel");
    assert!(matches!(
        transport.read_body(5),
        Err(TransportError::Closed { .. })
    ));
}

#[test]
fn close_disconnects() {
    let mut transport = connected(b"");
    transport.close();
    assert!(!transport.is_connected());
}
