use crate::{EngineId, QueryUnit};

/// Side effects requested by [`crate::update`], to be performed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Load the checkpoint and build the work queue.
    BuildQueue,
    LaunchBackend,
    /// Drive one unit through the retry executor.
    Execute(QueryUnit),
    AppendResult {
        engine: EngineId,
        query: String,
        links: Vec<String>,
    },
    /// Add the query to the checkpoint set and persist it.
    MarkCompleted { query: String },
    /// Sleep for a pacing delay before the next unit.
    Pause,
    ReleaseBackend,
}
