//! Tube context tracking and reconciliation planning.
//!
//! Every connection carries server-side state: the tube it uses for
//! producing and the set of tubes it watches for reserving. A
//! [`TubeContext`] records that state. Before a command runs, the connection
//! compares its confirmed context with the one the caller wants and issues
//! the [`ContextOp`]s returned by [`TubeContext::plan`] for the facet the
//! command depends on.

use std::collections::BTreeSet;

use crate::command::Command;
use crate::error::ContextError;
use crate::name::TubeName;

/// The part of a tube context a command depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextFacet {
    /// The tube used for producing.
    Current,
    /// The tubes watched for reserving.
    Watched,
}

/// One step that moves a connection toward a desired context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOp {
    /// Switch the current tube.
    Use(TubeName),
    /// Start watching a tube.
    Watch(TubeName),
    /// Stop watching a tube.
    Ignore(TubeName),
}

impl ContextOp {
    /// The protocol command performing this step.
    #[must_use]
    pub fn to_command(&self) -> Command {
        match self {
            Self::Use(tube) => Command::Use { tube: tube.clone() },
            Self::Watch(tube) => Command::Watch { tube: tube.clone() },
            Self::Ignore(tube) => Command::Ignore { tube: tube.clone() },
        }
    }

    /// The step a successfully executed context command represents.
    #[must_use]
    pub fn from_command(command: &Command) -> Option<Self> {
        match command {
            Command::Use { tube } => Some(Self::Use(tube.clone())),
            Command::Watch { tube } => Some(Self::Watch(tube.clone())),
            Command::Ignore { tube } => Some(Self::Ignore(tube.clone())),
            _ => None,
        }
    }
}

/// The tube used and the tubes watched by a connection.
///
/// The watched set is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TubeContext {
    current: TubeName,
    watched: BTreeSet<TubeName>,
}

impl Default for TubeContext {
    fn default() -> Self {
        Self::for_tube(TubeName::default())
    }
}

impl TubeContext {
    /// Builds a context from a current tube and a watch list.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::EmptyWatchList`] when `watched` is empty.
    pub fn new(
        current: TubeName,
        watched: impl IntoIterator<Item = TubeName>,
    ) -> Result<Self, ContextError> {
        let watch_list: BTreeSet<TubeName> = watched.into_iter().collect();
        if watch_list.is_empty() {
            return Err(ContextError::EmptyWatchList);
        }
        Ok(Self {
            current,
            watched: watch_list,
        })
    }

    /// A context that uses and watches only `tube`.
    #[must_use]
    pub fn for_tube(tube: TubeName) -> Self {
        let watched = BTreeSet::from([tube.clone()]);
        Self {
            current: tube,
            watched,
        }
    }

    /// Tube used for producing.
    #[must_use]
    pub const fn current(&self) -> &TubeName {
        &self.current
    }

    /// Tubes watched for reserving.
    #[must_use]
    pub const fn watched(&self) -> &BTreeSet<TubeName> {
        &self.watched
    }

    /// Whether `tube` is watched.
    #[must_use]
    pub fn is_watching(&self, tube: &str) -> bool {
        self.watched.contains(tube)
    }

    /// Switches the current tube.
    pub fn use_tube(&mut self, tube: TubeName) {
        self.current = tube;
    }

    /// Adds `tube` to the watch list, returning whether it was new.
    pub fn watch(&mut self, tube: TubeName) -> bool {
        self.watched.insert(tube)
    }

    /// Removes `tube` from the watch list, returning whether it was watched.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::LastWatchedTube`] when `tube` is the only
    /// watched tube.
    pub fn ignore(&mut self, tube: &TubeName) -> Result<bool, ContextError> {
        if !self.watched.contains(tube) {
            return Ok(false);
        }
        if self.watched.len() == 1 {
            return Err(ContextError::LastWatchedTube { tube: tube.clone() });
        }
        Ok(self.watched.remove(tube))
    }

    /// Returns a copy of this context with `op` applied.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::LastWatchedTube`] when `op` would leave
    /// nothing watched.
    pub fn apply(&self, op: &ContextOp) -> Result<Self, ContextError> {
        let mut next = self.clone();
        match op {
            ContextOp::Use(tube) => next.use_tube(tube.clone()),
            ContextOp::Watch(tube) => {
                next.watch(tube.clone());
            }
            ContextOp::Ignore(tube) => {
                next.ignore(tube)?;
            }
        }
        Ok(next)
    }

    /// Plans the steps that align `facet` of this context with `desired`.
    ///
    /// For the current facet this is at most one `use`. For the watched facet
    /// every missing tube is watched before any surplus tube is ignored, so
    /// the watch list never passes through an empty state. An aligned
    /// context yields no steps.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::LastWatchedTube`] if an ignore would leave
    /// nothing watched.
    pub fn plan(
        &self,
        desired: &Self,
        facet: ContextFacet,
    ) -> Result<Vec<ContextOp>, ContextError> {
        match facet {
            ContextFacet::Current if self.current == desired.current => Ok(Vec::new()),
            ContextFacet::Current => Ok(vec![ContextOp::Use(desired.current.clone())]),
            ContextFacet::Watched => self.plan_watched(desired),
        }
    }

    fn plan_watched(&self, desired: &Self) -> Result<Vec<ContextOp>, ContextError> {
        let mut ops: Vec<ContextOp> = desired
            .watched
            .difference(&self.watched)
            .cloned()
            .map(ContextOp::Watch)
            .collect();

        let mut remaining = self.watched.len() + ops.len();
        for tube in self.watched.difference(&desired.watched) {
            if remaining <= 1 {
                return Err(ContextError::LastWatchedTube { tube: tube.clone() });
            }
            remaining -= 1;
            ops.push(ContextOp::Ignore(tube.clone()));
        }
        Ok(ops)
    }
}
