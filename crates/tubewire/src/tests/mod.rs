//! Shared doubles for facade tests and the behaviour suites.

use mockall::mock;

use crate::command::Command;
use crate::context::TubeContext;
use crate::dispatcher::Dispatcher;
use crate::error::{ClientError, ProtocolError, ProtocolErrorKind};
use crate::response::{Payload, Response, Status};

mod behaviour;
mod manager;

mock! {
    pub QueueServer {}
    impl Dispatcher for QueueServer {
        fn dispatch_with(
            &self,
            context: &TubeContext,
            command: &Command,
        ) -> Result<Response, ClientError>;
    }
}

pub(crate) const SERVER: &str = "queue.test:11300";

pub(crate) fn respond(status: Status, payload: Payload) -> Result<Response, ClientError> {
    Ok(Response::new(status, payload, SERVER))
}

pub(crate) fn refuse(kind: ProtocolErrorKind, command: &Command) -> Result<Response, ClientError> {
    Err(ProtocolError::new(kind, command.command_line(), SERVER, "refused").into())
}
