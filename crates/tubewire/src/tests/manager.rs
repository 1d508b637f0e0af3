//! Unit tests for the manager facade.

use std::collections::BTreeMap;

use super::{MockQueueServer, refuse, respond};
use crate::command::Command;
use crate::context::TubeContext;
use crate::error::ProtocolErrorKind;
use crate::job::JobState;
use crate::manager::Manager;
use crate::response::{Payload, StatValue, Status};

#[test]
fn stats_uses_server_command() {
    let mut server = MockQueueServer::new();
    server
        .expect_dispatch_with()
        .withf(|context, command| *context == TubeContext::default() && *command == Command::Stats)
        .returning(|_, _| {
            let entries = BTreeMap::from([("uptime".to_owned(), StatValue::Integer(42))]);
            respond(Status::Ok, Payload::Map(entries))
        });
    let manager = Manager::new(&server);

    let stats = manager.stats().expect("stats");

    assert_eq!(stats.get("uptime"), Some(&StatValue::Integer(42)));
}

#[test]
fn peek_missing_job_yields_none() {
    let mut server = MockQueueServer::new();
    server
        .expect_dispatch_with()
        .withf(|_, command| *command == Command::Peek { id: 99 })
        .returning(|_, command| refuse(ProtocolErrorKind::NotFound, command));
    let manager = Manager::new(&server);

    assert_eq!(manager.peek(99).expect("peek"), None);
}

#[test]
fn peek_found_job_has_unknown_state() {
    let mut server = MockQueueServer::new();
    server.expect_dispatch_with().returning(|_, _| {
        respond(
            Status::Found,
            Payload::Job {
                id: 3,
                data: b"body".to_vec(),
            },
        )
    });
    let manager = Manager::new(&server);

    let job = manager.peek(3).expect("peek").expect("a job");

    assert_eq!(job.data(), b"body");
    assert_eq!(job.state(), JobState::Unknown);
}

#[test]
fn tubes_wrap_listed_names() {
    let mut server = MockQueueServer::new();
    server.expect_dispatch_with().returning(|_, _| {
        respond(
            Status::Ok,
            Payload::List(vec!["default".to_owned(), "emails".to_owned()]),
        )
    });
    let manager = Manager::new(&server);

    let tubes = manager.tubes().expect("tubes");

    let names: Vec<&str> = tubes.iter().map(|tube| tube.name().as_str()).collect();
    assert_eq!(names, ["default", "emails"]);
    assert!(tubes[1].context().is_watching("emails"));
}

#[test]
fn delete_propagates_not_found() {
    let mut server = MockQueueServer::new();
    server
        .expect_dispatch_with()
        .returning(|_, command| refuse(ProtocolErrorKind::NotFound, command));
    let manager = Manager::new(&server);

    let error = manager.delete(5).expect_err("missing job");

    assert!(error.is_not_found());
}

#[test]
fn kick_job_sends_id() {
    let mut server = MockQueueServer::new();
    server
        .expect_dispatch_with()
        .withf(|_, command| command.command_line() == "kick-job 12")
        .times(1)
        .returning(|_, _| respond(Status::Kicked, Payload::None));
    let manager = Manager::new(&server);

    manager.kick_job(12).expect("kick job");
}

#[test]
fn stats_job_rejects_wrong_payload() {
    let mut server = MockQueueServer::new();
    server
        .expect_dispatch_with()
        .returning(|_, _| respond(Status::Ok, Payload::List(Vec::new())));
    let manager = Manager::new(&server);

    assert!(manager.stats_job(1).is_err());
}
