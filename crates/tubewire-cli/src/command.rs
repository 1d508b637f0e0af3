//! Subcommands and their execution against a dispatcher.

use std::time::Duration;

use clap::Subcommand;
use tubewire::{ClientError, DEFAULT_PRIORITY, Dispatcher, Job, Manager, PutOptions, Tube};

use crate::output::{CommandOutput, JobView};

/// Queue operations exposed on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub(crate) enum QueueCommand {
    /// Print server statistics.
    Stats,
    /// List the tubes the server knows.
    Tubes,
    /// Store a job in the configured tube.
    Put {
        /// Job body.
        data: String,
        /// Priority; lower values are more urgent.
        #[arg(long, default_value_t = DEFAULT_PRIORITY)]
        priority: u32,
        /// Seconds before the job becomes ready.
        #[arg(long, default_value_t = 0)]
        delay: u64,
        /// Seconds a worker may hold the job.
        #[arg(long, default_value_t = 60)]
        ttr: u64,
    },
    /// Reserve a job from the configured tube.
    Reserve {
        /// Seconds to wait; waits indefinitely when omitted.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show the job with the given id.
    Peek {
        /// Job id.
        id: u64,
    },
    /// Show the next ready job in the configured tube.
    PeekReady,
    /// Show the next delayed job in the configured tube.
    PeekDelayed,
    /// Show the oldest buried job in the configured tube.
    PeekBuried,
    /// Delete the job with the given id.
    Delete {
        /// Job id.
        id: u64,
    },
    /// Kick up to `bound` buried or delayed jobs in the configured tube.
    Kick {
        /// Maximum number of jobs to kick.
        bound: u32,
    },
    /// Pause the configured tube; zero lifts a pause.
    Pause {
        /// Pause length in seconds.
        seconds: u64,
    },
    /// Print statistics for the configured tube.
    StatsTube,
}

impl QueueCommand {
    /// Runs the command through `dispatcher`, scoping tube commands to `tube`.
    pub(crate) fn execute<D>(&self, dispatcher: &D, tube: &str) -> Result<CommandOutput, ClientError>
    where
        D: Dispatcher + ?Sized,
    {
        let manager = Manager::new(dispatcher);
        let handle = || Tube::named(tube, dispatcher);
        let job = |found: Option<Job>| CommandOutput::Job(found.map(JobView::from));
        let output = match self {
            Self::Stats => CommandOutput::Stats(manager.stats()?),
            Self::Tubes => CommandOutput::Tubes {
                tubes: manager
                    .tubes()?
                    .iter()
                    .map(|listed| listed.name().to_string())
                    .collect(),
            },
            Self::Put {
                data,
                priority,
                delay,
                ttr,
            } => {
                let options = PutOptions {
                    priority: *priority,
                    delay: Duration::from_secs(*delay),
                    ttr: Duration::from_secs(*ttr),
                };
                CommandOutput::Inserted {
                    id: handle()?.put(data.as_bytes(), options)?,
                }
            }
            Self::Reserve { timeout } => job(handle()?.reserve(timeout.map(Duration::from_secs))?),
            Self::Peek { id } => job(manager.peek(*id)?),
            Self::PeekReady => job(handle()?.peek_ready()?),
            Self::PeekDelayed => job(handle()?.peek_delayed()?),
            Self::PeekBuried => job(handle()?.peek_buried()?),
            Self::Delete { id } => {
                manager.delete(*id)?;
                CommandOutput::Deleted { deleted: *id }
            }
            Self::Kick { bound } => CommandOutput::Kicked {
                kicked: handle()?.kick(*bound)?,
            },
            Self::Pause { seconds } => CommandOutput::Paused {
                paused: handle()?.pause(Duration::from_secs(*seconds))?,
            },
            Self::StatsTube => CommandOutput::Stats(handle()?.stats()?),
        };
        Ok(output)
    }
}
