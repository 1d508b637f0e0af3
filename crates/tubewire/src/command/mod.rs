//! Protocol command vocabulary.
//!
//! A [`Command`] is an immutable description of one request. It knows how to
//! frame itself for the wire, which facet of the tube context it depends on,
//! how to interpret the server's status line and which decoder handles a
//! response body. Constructors validate arguments so that no invalid request
//! reaches a socket.

mod interpret;

use std::num::NonZeroU32;
use std::time::Duration;

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::body::{BodyDecoder, RawDecoder, YamlListDecoder, YamlMapDecoder};
use crate::context::ContextFacet;
use crate::error::ClientError;
use crate::name::TubeName;

pub use interpret::{Reply, check_universal};

/// Priority given to jobs when the caller does not choose one.
pub const DEFAULT_PRIORITY: u32 = 1024;

/// Time-to-run given to jobs when the caller does not choose one.
pub const DEFAULT_TTR: Duration = Duration::from_secs(60);

/// Protocol token naming a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum CommandName {
    /// `put`
    Put,
    /// `use`
    Use,
    /// `reserve`
    Reserve,
    /// `reserve-with-timeout`
    ReserveWithTimeout,
    /// `delete`
    Delete,
    /// `release`
    Release,
    /// `bury`
    Bury,
    /// `touch`
    Touch,
    /// `watch`
    Watch,
    /// `ignore`
    Ignore,
    /// `peek`
    Peek,
    /// `peek-ready`
    PeekReady,
    /// `peek-delayed`
    PeekDelayed,
    /// `peek-buried`
    PeekBuried,
    /// `kick`
    Kick,
    /// `kick-job`
    KickJob,
    /// `stats-job`
    StatsJob,
    /// `stats-tube`
    StatsTube,
    /// `stats`
    Stats,
    /// `list-tubes`
    ListTubes,
    /// `list-tube-used`
    ListTubeUsed,
    /// `list-tubes-watched`
    ListTubesWatched,
    /// `pause-tube`
    PauseTube,
    /// `quit`
    Quit,
}

/// Scheduling options for `put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutOptions {
    /// Job priority; lower values are reserved first.
    pub priority: u32,
    /// Delay before the job becomes ready.
    pub delay: Duration,
    /// Time a reserver has before the job is released again.
    pub ttr: Duration,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY,
            delay: Duration::ZERO,
            ttr: DEFAULT_TTR,
        }
    }
}

/// One protocol request.
///
/// Delays, time-to-run values and timeouts are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store a job in the current tube.
    Put {
        /// Job priority.
        priority: u32,
        /// Seconds before the job becomes ready.
        delay: u64,
        /// Seconds a reserver may hold the job.
        ttr: u64,
        /// Job body.
        data: Vec<u8>,
    },
    /// Change the current tube.
    Use {
        /// Tube to use.
        tube: TubeName,
    },
    /// Reserve a job from the watched tubes, waiting indefinitely.
    Reserve,
    /// Reserve a job from the watched tubes, waiting at most `timeout` seconds.
    ReserveWithTimeout {
        /// Seconds to wait.
        timeout: u64,
    },
    /// Delete a job.
    Delete {
        /// Job id.
        id: u64,
    },
    /// Release a reserved job back to the ready queue.
    Release {
        /// Job id.
        id: u64,
        /// New priority.
        priority: u32,
        /// Seconds before the job becomes ready.
        delay: u64,
    },
    /// Bury a reserved job.
    Bury {
        /// Job id.
        id: u64,
        /// New priority.
        priority: u32,
    },
    /// Extend a reserved job's time-to-run.
    Touch {
        /// Job id.
        id: u64,
    },
    /// Add a tube to the watch list.
    Watch {
        /// Tube to watch.
        tube: TubeName,
    },
    /// Remove a tube from the watch list.
    Ignore {
        /// Tube to ignore.
        tube: TubeName,
    },
    /// Inspect a job by id.
    Peek {
        /// Job id.
        id: u64,
    },
    /// Inspect the next ready job in the current tube.
    PeekReady,
    /// Inspect the delayed job closest to becoming ready in the current tube.
    PeekDelayed,
    /// Inspect the oldest buried job in the current tube.
    PeekBuried,
    /// Kick up to `bound` buried or delayed jobs in the current tube.
    Kick {
        /// Maximum number of jobs to kick.
        bound: NonZeroU32,
    },
    /// Kick a single buried or delayed job.
    KickJob {
        /// Job id.
        id: u64,
    },
    /// Statistics for one job.
    StatsJob {
        /// Job id.
        id: u64,
    },
    /// Statistics for one tube.
    StatsTube {
        /// Tube to inspect.
        tube: TubeName,
    },
    /// Server-wide statistics.
    Stats,
    /// Names of all existing tubes.
    ListTubes,
    /// Name of the current tube.
    ListTubeUsed,
    /// Names of the watched tubes.
    ListTubesWatched,
    /// Stop handing out jobs from a tube for `delay` seconds.
    PauseTube {
        /// Tube to pause.
        tube: TubeName,
        /// Seconds to pause for.
        delay: u64,
    },
    /// Close the connection.
    Quit,
}

static RAW: RawDecoder = RawDecoder;
static YAML_LIST: YamlListDecoder = YamlListDecoder;
static YAML_MAP: YamlMapDecoder = YamlMapDecoder;

impl Command {
    /// `put` with the given scheduling options.
    #[must_use]
    pub fn put(data: impl Into<Vec<u8>>, options: PutOptions) -> Self {
        Self::Put {
            priority: options.priority,
            delay: options.delay.as_secs(),
            ttr: options.ttr.as_secs(),
            data: data.into(),
        }
    }

    /// `use <tube>`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidName`] when `tube` breaks the grammar.
    pub fn use_tube(tube: &str) -> Result<Self, ClientError> {
        Ok(Self::Use {
            tube: TubeName::new(tube)?,
        })
    }

    /// `watch <tube>`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidName`] when `tube` breaks the grammar.
    pub fn watch(tube: &str) -> Result<Self, ClientError> {
        Ok(Self::Watch {
            tube: TubeName::new(tube)?,
        })
    }

    /// `ignore <tube>`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidName`] when `tube` breaks the grammar.
    pub fn ignore(tube: &str) -> Result<Self, ClientError> {
        Ok(Self::Ignore {
            tube: TubeName::new(tube)?,
        })
    }

    /// `reserve`, or `reserve-with-timeout` when a timeout is given.
    #[must_use]
    pub const fn reserve(timeout: Option<Duration>) -> Self {
        match timeout {
            Some(limit) => Self::ReserveWithTimeout {
                timeout: limit.as_secs(),
            },
            None => Self::Reserve,
        }
    }

    /// `kick <bound>`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] when `bound` is zero.
    pub fn kick(bound: u32) -> Result<Self, ClientError> {
        let positive = NonZeroU32::new(bound).ok_or_else(|| ClientError::InvalidArgument {
            argument: "kick bound",
            reason: "must be at least 1".to_owned(),
        })?;
        Ok(Self::Kick { bound: positive })
    }

    /// `stats-tube <tube>`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidName`] when `tube` breaks the grammar.
    pub fn stats_tube(tube: &str) -> Result<Self, ClientError> {
        Ok(Self::StatsTube {
            tube: TubeName::new(tube)?,
        })
    }

    /// `pause-tube <tube> <delay>`; a zero delay unpauses immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidName`] when `tube` breaks the grammar.
    pub fn pause_tube(tube: &str, delay: Duration) -> Result<Self, ClientError> {
        Ok(Self::PauseTube {
            tube: TubeName::new(tube)?,
            delay: delay.as_secs(),
        })
    }

    /// Protocol token of this command.
    #[must_use]
    pub const fn name(&self) -> CommandName {
        match self {
            Self::Put { .. } => CommandName::Put,
            Self::Use { .. } => CommandName::Use,
            Self::Reserve => CommandName::Reserve,
            Self::ReserveWithTimeout { .. } => CommandName::ReserveWithTimeout,
            Self::Delete { .. } => CommandName::Delete,
            Self::Release { .. } => CommandName::Release,
            Self::Bury { .. } => CommandName::Bury,
            Self::Touch { .. } => CommandName::Touch,
            Self::Watch { .. } => CommandName::Watch,
            Self::Ignore { .. } => CommandName::Ignore,
            Self::Peek { .. } => CommandName::Peek,
            Self::PeekReady => CommandName::PeekReady,
            Self::PeekDelayed => CommandName::PeekDelayed,
            Self::PeekBuried => CommandName::PeekBuried,
            Self::Kick { .. } => CommandName::Kick,
            Self::KickJob { .. } => CommandName::KickJob,
            Self::StatsJob { .. } => CommandName::StatsJob,
            Self::StatsTube { .. } => CommandName::StatsTube,
            Self::Stats => CommandName::Stats,
            Self::ListTubes => CommandName::ListTubes,
            Self::ListTubeUsed => CommandName::ListTubeUsed,
            Self::ListTubesWatched => CommandName::ListTubesWatched,
            Self::PauseTube { .. } => CommandName::PauseTube,
            Self::Quit => CommandName::Quit,
        }
    }

    /// Space-separated arguments following the command name.
    fn arguments(&self) -> Vec<String> {
        match self {
            Self::Put {
                priority,
                delay,
                ttr,
                data,
            } => vec![
                priority.to_string(),
                delay.to_string(),
                ttr.to_string(),
                data.len().to_string(),
            ],
            Self::Use { tube }
            | Self::Watch { tube }
            | Self::Ignore { tube }
            | Self::StatsTube { tube } => vec![tube.to_string()],
            Self::ReserveWithTimeout { timeout } => vec![timeout.to_string()],
            Self::Delete { id }
            | Self::Touch { id }
            | Self::Peek { id }
            | Self::KickJob { id }
            | Self::StatsJob { id } => vec![id.to_string()],
            Self::Release {
                id,
                priority,
                delay,
            } => vec![id.to_string(), priority.to_string(), delay.to_string()],
            Self::Bury { id, priority } => vec![id.to_string(), priority.to_string()],
            Self::Kick { bound } => vec![bound.to_string()],
            Self::PauseTube { tube, delay } => vec![tube.to_string(), delay.to_string()],
            Self::Reserve
            | Self::PeekReady
            | Self::PeekDelayed
            | Self::PeekBuried
            | Self::Stats
            | Self::ListTubes
            | Self::ListTubeUsed
            | Self::ListTubesWatched
            | Self::Quit => Vec::new(),
        }
    }

    /// The request line without its terminator, e.g. `peek 42`.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.name().as_ref().to_owned();
        for argument in self.arguments() {
            line.push(' ');
            line.push_str(&argument);
        }
        line
    }

    /// The complete request as sent on the wire.
    #[must_use]
    pub fn to_request(&self) -> Vec<u8> {
        let mut request = self.command_line().into_bytes();
        request.extend_from_slice(b"\r\n");
        if let Self::Put { data, .. } = self {
            request.extend_from_slice(data);
            request.extend_from_slice(b"\r\n");
        }
        request
    }

    /// Tube context facet the command depends on, if any.
    #[must_use]
    pub const fn facet(&self) -> Option<ContextFacet> {
        match self {
            Self::Put { .. }
            | Self::PeekReady
            | Self::PeekDelayed
            | Self::PeekBuried
            | Self::Kick { .. }
            | Self::ListTubeUsed => Some(ContextFacet::Current),
            Self::Reserve | Self::ReserveWithTimeout { .. } | Self::ListTubesWatched => {
                Some(ContextFacet::Watched)
            }
            _ => None,
        }
    }

    /// Whether the server answers this command at all.
    #[must_use]
    pub const fn expects_reply(&self) -> bool {
        !matches!(self, Self::Quit)
    }

    /// Decoder for an `OK <bytes>` body answering this command.
    #[must_use]
    pub fn decoder(&self) -> &'static dyn BodyDecoder {
        match self {
            Self::ListTubes | Self::ListTubesWatched => &YAML_LIST,
            Self::Stats | Self::StatsJob { .. } | Self::StatsTube { .. } => &YAML_MAP,
            _ => &RAW,
        }
    }
}
