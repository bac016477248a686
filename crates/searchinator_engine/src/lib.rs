//! Searchinator engine: rendering backends, durable stores and the run driver.
mod decode;
mod http;
mod identity;
mod orchestrator;
mod pace;
mod persist;
mod queue;
mod render;
mod retry;
mod store;
pub mod stub;
mod types;

pub use decode::decode_page;
pub use http::{HttpLauncher, HttpSettings};
pub use identity::{pick_identity, USER_AGENTS};
pub use orchestrator::{Orchestrator, RunError, RunReport, RunSettings};
pub use pace::{Sleeper, TokioSleeper};
pub use persist::{ensure_dir, write_atomically, PersistError};
pub use queue::load_queue;
pub use render::{BackendLauncher, RenderBackend, RenderSession};
pub use retry::{execute, Execution, RetryPolicy};
pub use store::{CheckpointStore, JsonCheckpointStore, JsonResultAccumulator, ResultSink};
pub use types::{LaunchMode, RenderError, RenderErrorKind};
