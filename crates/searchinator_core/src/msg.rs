use crate::{Outcome, QueryUnit, WorkQueue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The run was started.
    BuildStarted,
    /// The work queue was built from the query files and the checkpoint.
    QueueBuilt(WorkQueue),
    /// The rendering backend is up.
    BackendLaunched,
    /// The rendering backend could not be launched at all.
    BackendLaunchFailed(String),
    /// The retry executor finished a unit.
    UnitFinished { unit: QueryUnit, outcome: Outcome },
    /// The inter-unit pause ran to completion.
    PauseElapsed,
    /// Operator interrupt; honored between units.
    CancelRequested,
    /// The rendering backend was shut down.
    BackendReleased,
}
