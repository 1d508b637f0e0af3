//! Tube-scoped operations.
//!
//! A [`Tube`] carries its own tube context (using and watching only itself)
//! and hands every command to a [`Dispatcher`] together with that context,
//! so whichever connection runs the command is first aligned with the tube.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::command::{Command, PutOptions};
use crate::context::TubeContext;
use crate::dispatcher::Dispatcher;
use crate::error::{ClientError, ProtocolErrorKind};
use crate::job::{Job, JobState, found, map_of, number_of};
use crate::name::TubeName;
use crate::response::{Response, StatValue, Status};

/// A handle on one tube.
#[derive(Debug)]
pub struct Tube<'d, D: ?Sized> {
    name: TubeName,
    context: TubeContext,
    dispatcher: &'d D,
}

impl<'d, D: Dispatcher + ?Sized> Tube<'d, D> {
    /// A handle on `name`, dispatching through `dispatcher`.
    #[must_use]
    pub fn new(name: TubeName, dispatcher: &'d D) -> Self {
        let context = TubeContext::for_tube(name.clone());
        Self {
            name,
            context,
            dispatcher,
        }
    }

    /// Validates `name` and returns a handle on it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidName`] when `name` breaks the grammar.
    pub fn named(name: &str, dispatcher: &'d D) -> Result<Self, ClientError> {
        Ok(Self::new(TubeName::new(name)?, dispatcher))
    }

    /// Tube name.
    #[must_use]
    pub const fn name(&self) -> &TubeName {
        &self.name
    }

    /// Context every command of this handle is dispatched with.
    #[must_use]
    pub const fn context(&self) -> &TubeContext {
        &self.context
    }

    fn send(&self, command: &Command) -> Result<Response, ClientError> {
        self.dispatcher.dispatch_with(&self.context, command)
    }

    /// Stores a job, returning its id.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error, e.g. [`ProtocolErrorKind::JobTooBig`].
    pub fn put(&self, data: impl Into<Vec<u8>>, options: PutOptions) -> Result<u64, ClientError> {
        let response = self.send(&Command::put(data, options))?;
        number_of(&response)
    }

    /// Reserves a job, waiting at most `timeout` when one is given.
    ///
    /// Returns `None` when the timeout expires.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error for anything but a timeout.
    pub fn reserve(&self, timeout: Option<Duration>) -> Result<Option<Job>, ClientError> {
        match self.send(&Command::reserve(timeout)) {
            Ok(response) => Job::from_response(response, JobState::Reserved).map(Some),
            Err(error) if error.protocol_kind() == Some(ProtocolErrorKind::Timeout) => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn peek(&self, command: &Command, state: JobState) -> Result<Option<Job>, ClientError> {
        found(self.send(command))?
            .map(|response| Job::from_response(response, state))
            .transpose()
    }

    /// The next ready job, if any.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error for anything but `NOT_FOUND`.
    pub fn peek_ready(&self) -> Result<Option<Job>, ClientError> {
        self.peek(&Command::PeekReady, JobState::Ready)
    }

    /// The delayed job closest to becoming ready, if any.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error for anything but `NOT_FOUND`.
    pub fn peek_delayed(&self) -> Result<Option<Job>, ClientError> {
        self.peek(&Command::PeekDelayed, JobState::Delayed)
    }

    /// The oldest buried job, if any.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error for anything but `NOT_FOUND`.
    pub fn peek_buried(&self) -> Result<Option<Job>, ClientError> {
        self.peek(&Command::PeekBuried, JobState::Buried)
    }

    /// Kicks up to `bound` buried or delayed jobs, returning how many moved.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] for a zero bound, before any
    /// I/O, or the dispatch error.
    pub fn kick(&self, bound: u32) -> Result<u64, ClientError> {
        let command = Command::kick(bound)?;
        let response = self.send(&command)?;
        number_of(&response)
    }

    /// Tube statistics.
    ///
    /// # Errors
    ///
    /// Returns the dispatch or decoding error.
    pub fn stats(&self) -> Result<BTreeMap<String, StatValue>, ClientError> {
        let response = self.send(&Command::StatsTube {
            tube: self.name.clone(),
        })?;
        map_of(response)
    }

    /// Pauses the tube for `delay`; a zero delay lifts a pause.
    ///
    /// Returns whether the server confirmed the pause.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error.
    pub fn pause(&self, delay: Duration) -> Result<bool, ClientError> {
        let response = self.send(&Command::PauseTube {
            tube: self.name.clone(),
            delay: delay.as_secs(),
        })?;
        Ok(response.status() == Status::Paused)
    }
}
