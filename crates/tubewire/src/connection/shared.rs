//! A connection that can be shared between threads.

use std::sync::{Mutex, MutexGuard};

use super::Connection;
use crate::command::Command;
use crate::context::TubeContext;
use crate::dispatcher::Dispatcher;
use crate::error::ClientError;
use crate::response::Response;
use crate::transport::{Connector, TcpConnector};

/// A [`Connection`] behind a mutex, so one command is in flight at a time.
#[derive(Debug)]
pub struct SharedConnection<C: Connector = TcpConnector> {
    identity: String,
    inner: Mutex<Connection<C>>,
}

impl<C: Connector> SharedConnection<C> {
    /// Wraps `connection`.
    #[must_use]
    pub fn new(connection: Connection<C>) -> Self {
        Self {
            identity: connection.identity().to_owned(),
            inner: Mutex::new(connection),
        }
    }

    /// Server identity, `host:port`.
    #[must_use]
    pub fn identity(&self) -> &str {
        self.identity.as_str()
    }

    /// Locks the connection for exclusive use.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectionPoisoned`] when a previous holder
    /// panicked.
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection<C>>, ClientError> {
        self.inner
            .lock()
            .map_err(|_| ClientError::ConnectionPoisoned {
                server: self.identity.clone(),
            })
    }

    /// Whether the stream is open.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectionPoisoned`] when a previous holder
    /// panicked.
    pub fn is_connected(&self) -> Result<bool, ClientError> {
        Ok(self.lock()?.is_connected())
    }

    /// Sends `command` without reconciling.
    ///
    /// # Errors
    ///
    /// As [`Connection::dispatch`].
    pub fn dispatch(&self, command: &Command) -> Result<Response, ClientError> {
        self.lock()?.dispatch(command)
    }

    /// Unwraps the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectionPoisoned`] when a previous holder
    /// panicked.
    pub fn into_inner(self) -> Result<Connection<C>, ClientError> {
        let identity = self.identity;
        self.inner
            .into_inner()
            .map_err(|_| ClientError::ConnectionPoisoned { server: identity })
    }
}

impl<C: Connector> From<Connection<C>> for SharedConnection<C> {
    fn from(connection: Connection<C>) -> Self {
        Self::new(connection)
    }
}

impl<C: Connector> Dispatcher for SharedConnection<C> {
    fn dispatch_with(
        &self,
        context: &TubeContext,
        command: &Command,
    ) -> Result<Response, ClientError> {
        self.lock()?.dispatch_in(context, command)
    }
}
