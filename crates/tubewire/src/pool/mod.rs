//! Dispatch across several queue servers.
//!
//! A [`Pool`] owns a fixed set of connections keyed by server identity and
//! one authoritative tube context. Each dispatch picks a single member
//! through its [`Selector`], reconciles that member toward the pool's context
//! (or a caller-supplied one) and runs the command there.

mod selector;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

pub use selector::{RandomSelector, RoundRobinSelector, Selector};

use crate::command::Command;
use crate::connection::{Connection, SharedConnection};
use crate::context::TubeContext;
use crate::dispatcher::Dispatcher;
use crate::error::ClientError;
use crate::name::TubeName;
use crate::response::Response;
use crate::transport::{Connector, TcpConnector};

const POOL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pool");

/// A fixed, non-empty set of connections sharing one tube context.
#[derive(Debug)]
pub struct Pool<C: Connector = TcpConnector, S: Selector = RandomSelector> {
    members: BTreeMap<String, SharedConnection<C>>,
    context: Mutex<TubeContext>,
    selector: S,
}

impl<C: Connector> Pool<C, RandomSelector> {
    /// Builds a pool that picks members at random.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::EmptyPool`] when `connections` is empty.
    pub fn new(connections: impl IntoIterator<Item = Connection<C>>) -> Result<Self, ClientError> {
        Self::with_selector(connections, RandomSelector)
    }
}

impl<C: Connector, S: Selector> Pool<C, S> {
    /// Builds a pool that picks members with `selector`.
    ///
    /// A later connection with the same identity as an earlier one replaces
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::EmptyPool`] when `connections` is empty.
    pub fn with_selector(
        connections: impl IntoIterator<Item = Connection<C>>,
        selector: S,
    ) -> Result<Self, ClientError> {
        let mut members = BTreeMap::new();
        for connection in connections {
            let shared = SharedConnection::new(connection);
            let identity = shared.identity().to_owned();
            if members.insert(identity.clone(), shared).is_some() {
                warn!(
                    target: POOL_TARGET,
                    server = %identity,
                    "duplicate server replaced in pool"
                );
            }
        }
        if members.is_empty() {
            return Err(ClientError::EmptyPool);
        }
        Ok(Self {
            members,
            context: Mutex::new(TubeContext::default()),
            selector,
        })
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the pool has no members, which construction rules out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Looks up a member by identity (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ServerNotFound`] when no member matches.
    pub fn get_server(&self, name: &str) -> Result<&SharedConnection<C>, ClientError> {
        self.members
            .get(name)
            .ok_or_else(|| ClientError::ServerNotFound {
                name: name.to_owned(),
            })
    }

    /// Members in identity order.
    pub fn servers(&self) -> impl Iterator<Item = &SharedConnection<C>> {
        self.members.values()
    }

    fn lock_context(&self) -> Result<MutexGuard<'_, TubeContext>, ClientError> {
        self.context
            .lock()
            .map_err(|_| ClientError::ContextPoisoned)
    }

    /// Snapshot of the pool's tube context.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ContextPoisoned`] when a previous holder
    /// panicked.
    pub fn context(&self) -> Result<TubeContext, ClientError> {
        Ok(self.lock_context()?.clone())
    }

    /// Makes `tube` the current tube for subsequent produce commands.
    ///
    /// No command is sent; members catch up on their next relevant dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidName`] for a malformed name or
    /// [`ClientError::ContextPoisoned`].
    pub fn use_tube(&self, tube: &str) -> Result<(), ClientError> {
        let name = TubeName::new(tube)?;
        self.lock_context()?.use_tube(name);
        Ok(())
    }

    /// Adds `tube` to the watch list for subsequent reserves, returning
    /// whether it was new.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidName`] for a malformed name or
    /// [`ClientError::ContextPoisoned`].
    pub fn watch(&self, tube: &str) -> Result<bool, ClientError> {
        let name = TubeName::new(tube)?;
        Ok(self.lock_context()?.watch(name))
    }

    /// Removes `tube` from the watch list for subsequent reserves, returning
    /// whether it was watched.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Context`] when `tube` is the last watched tube,
    /// [`ClientError::InvalidName`] for a malformed name or
    /// [`ClientError::ContextPoisoned`].
    pub fn ignore(&self, tube: &str) -> Result<bool, ClientError> {
        let name = TubeName::new(tube)?;
        Ok(self.lock_context()?.ignore(&name)?)
    }

    /// Dispatches `command` toward the pool's own tube context.
    ///
    /// # Errors
    ///
    /// As [`Dispatcher::dispatch_with`].
    pub fn dispatch(&self, command: &Command) -> Result<Response, ClientError> {
        let context = self.context()?;
        self.dispatch_with(&context, command)
    }

    fn choose(&self) -> Result<&SharedConnection<C>, ClientError> {
        let index = self.selector.select(self.members.len());
        self.members
            .values()
            .nth(index)
            .ok_or(ClientError::EmptyPool)
    }
}

impl<C: Connector, S: Selector> Dispatcher for Pool<C, S> {
    fn dispatch_with(
        &self,
        context: &TubeContext,
        command: &Command,
    ) -> Result<Response, ClientError> {
        let member = self.choose()?;
        debug!(
            target: POOL_TARGET,
            server = %member.identity(),
            command = %command.name(),
            "selected pool member"
        );
        member.dispatch_with(context, command)
    }
}
