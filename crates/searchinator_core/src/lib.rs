//! Searchinator core: pure run state machine, work-queue construction and data model.
mod catalog;
mod checkpoint;
mod effect;
mod msg;
mod pacing;
mod queue;
mod state;
mod types;
mod update;

pub use catalog::{CatalogError, EngineCatalog, EngineConfig, TemplateError, QUERY_PLACEHOLDER};
pub use checkpoint::CheckpointSet;
pub use effect::Effect;
pub use msg::Msg;
pub use pacing::{DelayRange, RangeError};
pub use queue::{build_queue, parse_queries, WorkQueue};
pub use state::{RunPhase, RunState, RunStats};
pub use types::{EngineId, Outcome, QueryUnit, ResultRecord};
pub use update::update;
