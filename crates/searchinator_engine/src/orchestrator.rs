use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use searchinator_core::{
    update, CheckpointSet, DelayRange, Effect, EngineCatalog, EngineId, Msg, Outcome, QueryUnit,
    ResultRecord, RunPhase, RunState, RunStats,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::pace::{Sleeper, TokioSleeper};
use crate::queue::load_queue;
use crate::render::{BackendLauncher, RenderBackend};
use crate::retry::{execute, RetryPolicy};
use crate::store::{CheckpointStore, ResultSink};
use crate::{LaunchMode, RenderError};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSettings {
    /// Engines to run; `None` runs every configured engine.
    pub engine_filter: Option<BTreeSet<EngineId>>,
    pub launch_mode: LaunchMode,
    pub retry: RetryPolicy,
    /// Delay between consecutive units.
    pub pacing: DelayRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub stats: RunStats,
    /// Units left in the queue when the run stopped.
    pub remaining: usize,
    /// Set when an interrupt left units unprocessed.
    pub cancelled: bool,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("rendering backend could not be launched: {0}")]
    Launch(#[source] RenderError),
}

/// Runs the whole queue through one rendering backend, one unit at a time.
pub struct Orchestrator {
    catalog: EngineCatalog,
    settings: RunSettings,
    checkpoints: Arc<dyn CheckpointStore>,
    results: Arc<dyn ResultSink>,
    launcher: Arc<dyn BackendLauncher>,
    sleeper: Arc<dyn Sleeper>,
    rng: StdRng,
    cancel: CancellationToken,
    completed: CheckpointSet,
    backend: Option<Box<dyn RenderBackend>>,
    launch_error: Option<RenderError>,
}

impl Orchestrator {
    pub fn new(
        catalog: EngineCatalog,
        settings: RunSettings,
        checkpoints: Arc<dyn CheckpointStore>,
        results: Arc<dyn ResultSink>,
        launcher: Arc<dyn BackendLauncher>,
    ) -> Self {
        Self {
            catalog,
            settings,
            checkpoints,
            results,
            launcher,
            sleeper: Arc::new(TokioSleeper),
            rng: StdRng::from_entropy(),
            cancel: CancellationToken::new(),
            completed: CheckpointSet::new(),
            backend: None,
            launch_error: None,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Makes queue order, identities and delays reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the run at the next unit boundary when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(mut self) -> Result<RunReport, RunError> {
        let mut state = RunState::new();
        let mut pending = VecDeque::new();
        let mut cancel_reported = false;

        let (next, effects) = update(state, Msg::BuildStarted);
        state = next;
        pending.extend(effects);

        while let Some(effect) = pending.pop_front() {
            let reply = self.perform(effect).await;

            // Report the interrupt before the reply so a finishing unit is
            // still recorded and nothing new starts.
            if !cancel_reported && self.cancel.is_cancelled() {
                cancel_reported = true;
                engine_warn!("Cancellation requested; stopping after the current unit");
                let (next, effects) = update(state, Msg::CancelRequested);
                state = next;
                pending.extend(effects);
            }
            if let Some(msg) = reply {
                let (next, effects) = update(state, msg);
                state = next;
                pending.extend(effects);
            }
        }

        if let Some(backend) = self.backend.take() {
            if let Err(err) = backend.shutdown().await {
                engine_warn!("Failed to shut down rendering backend: {}", err);
            }
        }
        debug_assert_eq!(state.phase(), RunPhase::Done);

        if let Some(err) = self.launch_error.take() {
            return Err(RunError::Launch(err));
        }

        let stats = state.stats().clone();
        let remaining = state.remaining();
        // An interrupt during the last unit stopped nothing.
        let cancelled = state.is_cancelled() && remaining > 0;
        engine_info!(
            "Run finished: {} queued, {} succeeded, {} failed, {} remaining{}",
            stats.queued,
            stats.succeeded,
            stats.failed,
            remaining,
            if cancelled { " (cancelled)" } else { "" }
        );
        Ok(RunReport {
            stats,
            remaining,
            cancelled,
        })
    }

    async fn perform(&mut self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::BuildQueue => {
                self.completed = self.checkpoints.load();
                engine_info!("Loaded {} completed queries", self.completed.len());
                let queue = load_queue(
                    &self.catalog,
                    self.settings.engine_filter.as_ref(),
                    &self.completed,
                    &mut self.rng,
                );
                Some(Msg::QueueBuilt(queue))
            }
            Effect::LaunchBackend => match self.launcher.launch(self.settings.launch_mode).await {
                Ok(backend) => {
                    self.backend = Some(backend);
                    Some(Msg::BackendLaunched)
                }
                Err(err) => {
                    engine_error!("Failed to launch rendering backend: {}", err);
                    let message = err.to_string();
                    self.launch_error = Some(err);
                    Some(Msg::BackendLaunchFailed(message))
                }
            },
            Effect::Execute(unit) => {
                let outcome = self.execute_unit(&unit).await;
                Some(Msg::UnitFinished { unit, outcome })
            }
            Effect::AppendResult {
                engine,
                query,
                links,
            } => {
                if let Err(err) = self.results.append(&engine, ResultRecord::new(query, links)) {
                    engine_error!("Failed to record results for {}: {}", engine, err);
                }
                None
            }
            Effect::MarkCompleted { query } => {
                self.completed.insert(query);
                if let Err(err) = self.checkpoints.save(&self.completed) {
                    engine_error!("Failed to save checkpoint: {}", err);
                }
                None
            }
            Effect::Pause => {
                let delay = self.settings.pacing.sample(&mut self.rng);
                engine_debug!("Pausing {:?} before the next query", delay);
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => None,
                    _ = self.sleeper.sleep(delay) => Some(Msg::PauseElapsed),
                }
            }
            Effect::ReleaseBackend => {
                if let Some(backend) = self.backend.take() {
                    if let Err(err) = backend.shutdown().await {
                        engine_warn!("Failed to shut down rendering backend: {}", err);
                    }
                }
                Some(Msg::BackendReleased)
            }
        }
    }

    async fn execute_unit(&mut self, unit: &QueryUnit) -> Outcome {
        let (Some(engine), Some(backend)) = (self.catalog.get(unit.engine()), &self.backend) else {
            engine_error!("No engine or backend available for {}", unit.engine());
            return Outcome::Failure(format!("engine {} unavailable", unit.engine()));
        };
        let execution = execute(
            unit,
            engine,
            &**backend,
            &self.settings.retry,
            self.sleeper.as_ref(),
            &mut self.rng,
        )
        .await;
        if let Outcome::Failure(err) = &execution.outcome {
            engine_warn!(
                "'{}' failed after {} attempts: {}",
                unit.query(),
                execution.attempts,
                err
            );
        }
        execution.outcome
    }
}
