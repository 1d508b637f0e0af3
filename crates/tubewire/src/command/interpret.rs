//! Status line interpretation.
//!
//! Parsing runs in two tiers. [`check_universal`] recognises the failures any
//! command can receive; [`Command::interpret`] then matches the command's own
//! vocabulary. Anything else is an unexpected response.

use std::str::FromStr;

use super::Command;
use crate::error::ProtocolErrorKind;
use crate::response::{Payload, Scalar, Status};

/// What a status line says, before any body is read.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The exchange is complete; the line carried everything.
    Complete {
        /// Success status.
        status: Status,
        /// Inline payload.
        payload: Payload,
    },
    /// A job body of `length` bytes follows.
    Job {
        /// Success status.
        status: Status,
        /// Job id.
        id: u64,
        /// Body length in bytes.
        length: usize,
    },
    /// A data body of `length` bytes follows, for the command's decoder.
    Body {
        /// Success status.
        status: Status,
        /// Body length in bytes.
        length: usize,
    },
}

/// Shared first parsing tier.
///
/// # Errors
///
/// Returns the matching kind when the line starts with `BAD_FORMAT`,
/// `INTERNAL_ERROR`, `OUT_OF_MEMORY` or `UNKNOWN_COMMAND`.
pub fn check_universal(line: &str) -> Result<(), ProtocolErrorKind> {
    let token = line.split(' ').next().unwrap_or_default();
    ProtocolErrorKind::universal(token).map_or(Ok(()), Err)
}

fn arity<'a, const N: usize>(args: &[&'a str]) -> Result<[&'a str; N], ProtocolErrorKind> {
    <[&str; N]>::try_from(args).map_err(|_| ProtocolErrorKind::UnexpectedResponse)
}

fn numeric<T: FromStr>(text: &str) -> Result<T, ProtocolErrorKind> {
    text.parse()
        .map_err(|_| ProtocolErrorKind::UnexpectedResponse)
}

fn complete(status: Status, payload: Payload, args: &[&str]) -> Result<Reply, ProtocolErrorKind> {
    arity::<0>(args)?;
    Ok(Reply::Complete { status, payload })
}

fn number(status: Status, args: &[&str]) -> Result<Reply, ProtocolErrorKind> {
    let [value] = arity::<1>(args)?;
    Ok(Reply::Complete {
        status,
        payload: Payload::Scalar(Scalar::Number(numeric(value)?)),
    })
}

fn text(status: Status, args: &[&str]) -> Result<Reply, ProtocolErrorKind> {
    let [value] = arity::<1>(args)?;
    Ok(Reply::Complete {
        status,
        payload: Payload::Scalar(Scalar::Text(value.to_owned())),
    })
}

fn job(status: Status, args: &[&str]) -> Result<Reply, ProtocolErrorKind> {
    let [id, length] = arity::<2>(args)?;
    Ok(Reply::Job {
        status,
        id: numeric(id)?,
        length: numeric(length)?,
    })
}

fn body(status: Status, args: &[&str]) -> Result<Reply, ProtocolErrorKind> {
    let [length] = arity::<1>(args)?;
    Ok(Reply::Body {
        status,
        length: numeric(length)?,
    })
}

fn refuse(kind: ProtocolErrorKind, args: &[&str]) -> Result<Reply, ProtocolErrorKind> {
    arity::<0>(args)?;
    Err(kind)
}

impl Command {
    /// Interprets a status line (without CRLF) sent in answer to this command.
    ///
    /// # Errors
    ///
    /// Returns the [`ProtocolErrorKind`] the line reports, or
    /// [`ProtocolErrorKind::UnexpectedResponse`] for tokens, arity or
    /// arguments the command does not expect.
    pub fn interpret(&self, line: &str) -> Result<Reply, ProtocolErrorKind> {
        check_universal(line)?;

        let mut parts = line.split(' ');
        let token = parts.next().unwrap_or_default();
        let fields: Vec<&str> = parts.collect();
        let args = fields.as_slice();

        match (self, token) {
            (Self::Put { .. }, "INSERTED") => number(Status::Inserted, args),
            (Self::Put { .. }, "BURIED") => {
                arity::<1>(args)?;
                Err(ProtocolErrorKind::Buried)
            }
            (Self::Put { .. }, "EXPECTED_CRLF") => refuse(ProtocolErrorKind::ExpectedCrlf, args),
            (Self::Put { .. }, "JOB_TOO_BIG") => refuse(ProtocolErrorKind::JobTooBig, args),
            (Self::Put { .. }, "DRAINING") => refuse(ProtocolErrorKind::Draining, args),

            (Self::Use { tube }, "USING") => {
                let [named] = arity::<1>(args)?;
                if named != tube.as_str() {
                    return Err(ProtocolErrorKind::UnexpectedResponse);
                }
                text(Status::Using, args)
            }
            (Self::ListTubeUsed, "USING") => text(Status::Using, args),

            (Self::Reserve | Self::ReserveWithTimeout { .. }, "RESERVED") => {
                job(Status::Reserved, args)
            }
            (Self::Reserve | Self::ReserveWithTimeout { .. }, "DEADLINE_SOON") => {
                refuse(ProtocolErrorKind::DeadlineSoon, args)
            }
            (Self::ReserveWithTimeout { .. }, "TIMED_OUT") => {
                refuse(ProtocolErrorKind::Timeout, args)
            }

            (Self::Delete { .. }, "DELETED") => complete(Status::Deleted, Payload::None, args),
            (Self::Release { .. }, "RELEASED") => complete(Status::Released, Payload::None, args),
            (Self::Release { .. }, "BURIED") => refuse(ProtocolErrorKind::Buried, args),
            (Self::Bury { .. }, "BURIED") => complete(Status::Buried, Payload::None, args),
            (Self::Touch { .. }, "TOUCHED") => complete(Status::Touched, Payload::None, args),

            (Self::Watch { .. } | Self::Ignore { .. }, "WATCHING") => {
                number(Status::Watching, args)
            }
            (Self::Ignore { .. }, "NOT_IGNORED") => refuse(ProtocolErrorKind::NotIgnored, args),

            (
                Self::Peek { .. } | Self::PeekReady | Self::PeekDelayed | Self::PeekBuried,
                "FOUND",
            ) => job(Status::Found, args),

            (Self::Kick { .. }, "KICKED") => number(Status::Kicked, args),
            (Self::KickJob { .. }, "KICKED") => complete(Status::Kicked, Payload::None, args),

            (
                Self::StatsJob { .. }
                | Self::StatsTube { .. }
                | Self::Stats
                | Self::ListTubes
                | Self::ListTubesWatched,
                "OK",
            ) => body(Status::Ok, args),

            (Self::PauseTube { .. }, "PAUSED") => complete(Status::Paused, Payload::None, args),

            (
                Self::Delete { .. }
                | Self::Release { .. }
                | Self::Bury { .. }
                | Self::Touch { .. }
                | Self::Peek { .. }
                | Self::PeekReady
                | Self::PeekDelayed
                | Self::PeekBuried
                | Self::KickJob { .. }
                | Self::StatsJob { .. }
                | Self::StatsTube { .. }
                | Self::PauseTube { .. },
                "NOT_FOUND",
            ) => refuse(ProtocolErrorKind::NotFound, args),

            _ => Err(ProtocolErrorKind::UnexpectedResponse),
        }
    }
}
