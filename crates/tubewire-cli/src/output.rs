//! JSON views of command results.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;
use tubewire::{Job, JobState, StatValue};

use crate::AppError;

/// A job as printed on stdout; non-UTF-8 bytes are replaced.
#[derive(Debug, Serialize, PartialEq)]
pub struct JobView {
    /// Server-assigned job id.
    pub id: u64,
    /// Lifecycle state the command observed.
    pub state: JobState,
    /// Job body, decoded lossily.
    pub data: String,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id(),
            state: job.state(),
            data: String::from_utf8_lossy(job.data()).into_owned(),
        }
    }
}

/// Result of one subcommand.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CommandOutput {
    /// A statistics mapping.
    Stats(BTreeMap<String, StatValue>),
    /// Tube names known to the server.
    Tubes {
        /// Listed names.
        tubes: Vec<String>,
    },
    /// Id of a stored job.
    Inserted {
        /// New job id.
        id: u64,
    },
    /// A job, or `null` when none was available.
    Job(Option<JobView>),
    /// Number of jobs moved by a kick.
    Kicked {
        /// Jobs kicked.
        kicked: u64,
    },
    /// Id of a deleted job.
    Deleted {
        /// Removed job id.
        deleted: u64,
    },
    /// Whether a pause took effect.
    Paused {
        /// Server confirmation.
        paused: bool,
    },
}

pub(crate) fn write_output<W: Write>(stdout: &mut W, output: &CommandOutput) -> Result<(), AppError> {
    serde_json::to_writer(&mut *stdout, output).map_err(AppError::SerialiseOutput)?;
    stdout.write_all(b"\n").map_err(AppError::EmitOutput)?;
    stdout.flush().map_err(AppError::EmitOutput)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(CommandOutput::Inserted { id: 7 }, r#"{"id":7}"#)]
    #[case(CommandOutput::Job(None), "null")]
    #[case(CommandOutput::Paused { paused: true }, r#"{"paused":true}"#)]
    #[case(
        CommandOutput::Tubes { tubes: vec!["default".to_owned()] },
        r#"{"tubes":["default"]}"#
    )]
    fn outputs_render_as_compact_json(#[case] output: CommandOutput, #[case] expected: &str) {
        let mut buffer = Vec::new();
        write_output(&mut buffer, &output).expect("write output");
        assert_eq!(String::from_utf8(buffer).expect("utf8"), format!("{expected}\n"));
    }

    #[test]
    fn job_bodies_are_decoded_lossily() {
        let view = JobView::from(Job::new(3, vec![b'o', b'k', 0xff], JobState::Reserved));
        let json = serde_json::to_string(&view).expect("serialise");
        assert_eq!(view.data, "ok\u{fffd}");
        assert_eq!(json, "{\"id\":3,\"state\":\"reserved\",\"data\":\"ok\u{fffd}\"}");
    }
}
