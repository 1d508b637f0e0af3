//! Single-server command dispatch.
//!
//! A [`Connection`] owns one [`Transport`] and the tube context last
//! confirmed on it. Dispatching a command moves through the
//! [`DispatchStage`]s in order: the connection is checked, the command's
//! context facet is reconciled, the request is sent, the status line is read
//! and interpreted, and any declared body is read and decoded.

mod shared;

use std::fmt;

use tracing::{debug, trace};
use tubewire_config::ServerEndpoint;

pub use shared::SharedConnection;

use crate::command::{Command, Reply};
use crate::context::{ContextFacet, ContextOp, TubeContext};
use crate::error::{ClientError, ProtocolError, TransportError};
use crate::response::{Payload, Response, Status};
use crate::transport::{Connector, TcpConnector, Transport};

const CONNECTION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::connection");

/// Progress of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    /// Waiting to start; the connection must be open.
    Idle,
    /// Aligning the connection's tube context.
    Reconciling,
    /// Writing the request.
    Sending,
    /// Reading the status line.
    AwaitingResponse,
    /// Interpreting the status line and reading any body.
    Parsing,
    /// The response is complete.
    Done,
    /// The dispatch failed.
    Failed,
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Reconciling => "reconciling",
            Self::Sending => "sending",
            Self::AwaitingResponse => "awaiting-response",
            Self::Parsing => "parsing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        formatter.write_str(label)
    }
}

/// A connection to one queue server.
pub struct Connection<C: Connector = TcpConnector> {
    transport: Transport<C>,
    context: TubeContext,
}

impl<C: Connector> Connection<C> {
    /// Creates a disconnected connection.
    #[must_use]
    pub fn new(endpoint: ServerEndpoint, connector: C) -> Self {
        Self {
            transport: Transport::new(endpoint, connector),
            context: TubeContext::default(),
        }
    }

    /// Creates and connects a connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the connection fails.
    pub fn open(endpoint: ServerEndpoint, connector: C) -> Result<Self, ClientError> {
        let mut connection = Self::new(endpoint, connector);
        connection.connect()?;
        Ok(connection)
    }

    /// Opens the underlying stream. A fresh stream starts from the default
    /// tube context.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the connection fails.
    pub fn connect(&mut self) -> Result<(), ClientError> {
        self.context = TubeContext::default();
        self.transport.connect()?;
        debug!(target: CONNECTION_TARGET, server = %self.identity(), "connected");
        Ok(())
    }

    /// Drops the current stream, if any, and connects again.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the connection fails.
    pub fn reconnect(&mut self) -> Result<(), ClientError> {
        self.transport.close();
        self.connect()
    }

    /// Closes the stream without notifying the server.
    pub fn close(&mut self) {
        self.transport.close();
    }

    /// Whether the stream is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Server identity, `host:port`.
    #[must_use]
    pub fn identity(&self) -> &str {
        self.transport.identity()
    }

    /// Server endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &ServerEndpoint {
        self.transport.endpoint()
    }

    /// The tube context last confirmed by the server.
    #[must_use]
    pub const fn context(&self) -> &TubeContext {
        &self.context
    }

    fn stage(&self, stage: DispatchStage, command: &Command) {
        trace!(
            target: CONNECTION_TARGET,
            server = %self.identity(),
            command = %command.name(),
            %stage,
            "dispatch stage"
        );
    }

    fn ensure_connected(&self, command: &Command) -> Result<(), ClientError> {
        self.stage(DispatchStage::Idle, command);
        if self.is_connected() {
            Ok(())
        } else {
            self.stage(DispatchStage::Failed, command);
            Err(TransportError::NotConnected {
                server: self.identity().to_owned(),
            }
            .into())
        }
    }

    /// Aligns `facet` of the confirmed context with `desired`, returning the
    /// number of context commands issued.
    ///
    /// The confirmed context is updated after every successful step, so a
    /// failure part-way leaves it describing the server's actual state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Context`] when the plan is refused, or the
    /// error of the first context command that fails.
    pub fn reconcile(
        &mut self,
        desired: &TubeContext,
        facet: ContextFacet,
    ) -> Result<usize, ClientError> {
        let ops = self.context.plan(desired, facet)?;
        for op in &ops {
            debug!(
                target: CONNECTION_TARGET,
                server = %self.identity(),
                op = ?op,
                "reconciling tube context"
            );
            self.exchange(&op.to_command())?;
            self.context = self.context.apply(op)?;
        }
        Ok(ops.len())
    }

    /// Sends `command` as-is, without reconciling the tube context.
    ///
    /// Successful `use`, `watch` and `ignore` commands update the confirmed
    /// context. `quit` closes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] for socket failures (which also
    /// close the connection), [`ClientError::Protocol`] for refusals and
    /// unexpected responses and [`ClientError::Decode`] for malformed bodies.
    pub fn dispatch(&mut self, command: &Command) -> Result<Response, ClientError> {
        self.ensure_connected(command)?;
        self.send(command)
    }

    /// Reconciles the facet `command` depends on toward `desired`, then
    /// sends `command`.
    ///
    /// # Errors
    ///
    /// As [`Connection::reconcile`] and [`Connection::dispatch`]. A failed
    /// reconciliation step aborts before `command` is sent.
    pub fn dispatch_in(
        &mut self,
        desired: &TubeContext,
        command: &Command,
    ) -> Result<Response, ClientError> {
        self.ensure_connected(command)?;
        if let Some(facet) = command.facet() {
            self.stage(DispatchStage::Reconciling, command);
            if let Err(error) = self.reconcile(desired, facet) {
                self.stage(DispatchStage::Failed, command);
                return Err(error);
            }
        }
        self.send(command)
    }

    fn send(&mut self, command: &Command) -> Result<Response, ClientError> {
        let response = self.exchange(command)?;
        if let Some(op) = ContextOp::from_command(command) {
            self.context = self.context.apply(&op)?;
        }
        Ok(response)
    }

    fn exchange(&mut self, command: &Command) -> Result<Response, ClientError> {
        let result = self.try_exchange(command);
        let stage = if result.is_ok() {
            DispatchStage::Done
        } else {
            DispatchStage::Failed
        };
        self.stage(stage, command);
        result
    }

    fn try_exchange(&mut self, command: &Command) -> Result<Response, ClientError> {
        debug!(
            target: CONNECTION_TARGET,
            server = %self.identity(),
            command = %command.command_line(),
            "dispatching command"
        );

        self.stage(DispatchStage::Sending, command);
        self.transport.write(&command.to_request())?;
        if !command.expects_reply() {
            self.transport.close();
            return Ok(self.respond(Status::Closed, Payload::None));
        }

        self.stage(DispatchStage::AwaitingResponse, command);
        let line = self.transport.read_line()?;

        self.stage(DispatchStage::Parsing, command);
        let reply = command.interpret(&line).map_err(|kind| {
            ProtocolError::new(kind, command.command_line(), self.identity(), line.as_str())
        })?;
        match reply {
            Reply::Complete { status, payload } => Ok(self.respond(status, payload)),
            Reply::Job { status, id, length } => {
                let data = self.transport.read_body(length)?;
                Ok(self.respond(status, Payload::Job { id, data }))
            }
            Reply::Body { status, length } => {
                let body = self.transport.read_body(length)?;
                let payload =
                    command
                        .decoder()
                        .decode(&body)
                        .map_err(|source| ClientError::Decode {
                            server: self.identity().to_owned(),
                            source,
                        })?;
                Ok(self.respond(status, payload))
            }
        }
    }

    fn respond(&self, status: Status, payload: Payload) -> Response {
        Response::new(status, payload, self.identity())
    }
}

impl<C: Connector> fmt::Debug for Connection<C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Connection")
            .field("server", &self.identity())
            .field("connected", &self.is_connected())
            .field("context", &self.context)
            .finish()
    }
}
