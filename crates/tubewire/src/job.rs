//! Jobs returned by reserve and peek commands.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ClientError;
use crate::response::{Payload, Response, StatValue};

/// What the client last learned about a job's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Not known; jobs peeked by id start here.
    #[default]
    Unknown,
    /// Waiting to be reserved.
    Ready,
    /// Held by a worker.
    Reserved,
    /// Waiting for its delay to pass.
    Delayed,
    /// Set aside until kicked.
    Buried,
}

/// A job id and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: u64,
    data: Vec<u8>,
    state: JobState,
}

impl Job {
    /// Builds a job value.
    #[must_use]
    pub const fn new(id: u64, data: Vec<u8>, state: JobState) -> Self {
        Self { id, data, state }
    }

    /// Extracts the job carried by `response`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnexpectedPayload`] when the response does not
    /// carry a job.
    pub fn from_response(response: Response, state: JobState) -> Result<Self, ClientError> {
        let server = response.server().to_owned();
        match response.into_payload() {
            Payload::Job { id, data } => Ok(Self::new(id, data, state)),
            _ => Err(ClientError::UnexpectedPayload {
                server,
                expected: "a job",
            }),
        }
    }

    /// Job id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Job body.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Last known lifecycle state.
    #[must_use]
    pub const fn state(&self) -> JobState {
        self.state
    }

    /// Consumes the job, returning its body.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

pub(crate) fn number_of(response: &Response) -> Result<u64, ClientError> {
    response
        .number()
        .ok_or_else(|| ClientError::UnexpectedPayload {
            server: response.server().to_owned(),
            expected: "a number",
        })
}

pub(crate) fn map_of(response: Response) -> Result<BTreeMap<String, StatValue>, ClientError> {
    let server = response.server().to_owned();
    match response.into_payload() {
        Payload::Map(entries) => Ok(entries),
        _ => Err(ClientError::UnexpectedPayload {
            server,
            expected: "a mapping",
        }),
    }
}

pub(crate) fn list_of(response: Response) -> Result<Vec<String>, ClientError> {
    let server = response.server().to_owned();
    match response.into_payload() {
        Payload::List(items) => Ok(items),
        _ => Err(ClientError::UnexpectedPayload {
            server,
            expected: "a list",
        }),
    }
}

/// Turns a `NOT_FOUND` refusal into `None`.
pub(crate) fn found(
    result: Result<Response, ClientError>,
) -> Result<Option<Response>, ClientError> {
    match result {
        Ok(response) => Ok(Some(response)),
        Err(error) if error.is_not_found() => Ok(None),
        Err(error) => Err(error),
    }
}
