//! The seam between facades and whatever executes their commands.

use crate::command::Command;
use crate::context::TubeContext;
use crate::error::ClientError;
use crate::response::Response;

/// Executes commands against a tube context chosen by the caller.
///
/// Implemented by [`crate::Pool`] and [`crate::SharedConnection`]; facades
/// such as [`crate::Tube`] only depend on this trait.
pub trait Dispatcher {
    /// Aligns the executing connection with `context` for the facet
    /// `command` depends on, then sends `command`.
    ///
    /// # Errors
    ///
    /// Returns the [`ClientError`] raised while reconciling or dispatching.
    fn dispatch_with(
        &self,
        context: &TubeContext,
        command: &Command,
    ) -> Result<Response, ClientError>;
}
