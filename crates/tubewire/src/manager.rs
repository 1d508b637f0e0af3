//! Server-wide operations.

use std::collections::BTreeMap;

use crate::command::Command;
use crate::context::TubeContext;
use crate::dispatcher::Dispatcher;
use crate::error::ClientError;
use crate::job::{Job, JobState, found, list_of, map_of};
use crate::name::TubeName;
use crate::response::{Response, StatValue};
use crate::tube::Tube;

/// Commands that concern the server or individual jobs rather than a tube.
#[derive(Debug)]
pub struct Manager<'d, D: ?Sized> {
    context: TubeContext,
    dispatcher: &'d D,
}

impl<'d, D: Dispatcher + ?Sized> Manager<'d, D> {
    /// A manager dispatching through `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: &'d D) -> Self {
        Self {
            context: TubeContext::default(),
            dispatcher,
        }
    }

    fn send(&self, command: &Command) -> Result<Response, ClientError> {
        self.dispatcher.dispatch_with(&self.context, command)
    }

    /// Server statistics.
    ///
    /// # Errors
    ///
    /// Returns the dispatch or decoding error.
    pub fn stats(&self) -> Result<BTreeMap<String, StatValue>, ClientError> {
        map_of(self.send(&Command::Stats)?)
    }

    /// The job with `id`, if it exists.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error for anything but `NOT_FOUND`.
    pub fn peek(&self, id: u64) -> Result<Option<Job>, ClientError> {
        found(self.send(&Command::Peek { id }))?
            .map(|response| Job::from_response(response, JobState::Unknown))
            .transpose()
    }

    /// Handles on every tube the server knows.
    ///
    /// # Errors
    ///
    /// Returns the dispatch or decoding error, or
    /// [`ClientError::InvalidName`] if the server lists a malformed name.
    pub fn tubes(&self) -> Result<Vec<Tube<'d, D>>, ClientError> {
        list_of(self.send(&Command::ListTubes)?)?
            .into_iter()
            .map(|name| {
                TubeName::new(name)
                    .map(|tube| Tube::new(tube, self.dispatcher))
                    .map_err(ClientError::from)
            })
            .collect()
    }

    /// Deletes the job with `id`.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error, e.g. `NOT_FOUND`.
    pub fn delete(&self, id: u64) -> Result<(), ClientError> {
        self.send(&Command::Delete { id })?;
        Ok(())
    }

    /// Kicks the buried or delayed job with `id`.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error, e.g. `NOT_FOUND`.
    pub fn kick_job(&self, id: u64) -> Result<(), ClientError> {
        self.send(&Command::KickJob { id })?;
        Ok(())
    }

    /// Statistics for the job with `id`.
    ///
    /// # Errors
    ///
    /// Returns the dispatch or decoding error.
    pub fn stats_job(&self, id: u64) -> Result<BTreeMap<String, StatValue>, ClientError> {
        map_of(self.send(&Command::StatsJob { id })?)
    }
}
