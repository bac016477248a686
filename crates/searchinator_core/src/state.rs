use crate::{QueryUnit, WorkQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Building,
    Running,
    Draining,
    Done,
}

/// What the run is currently blocked on while `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Awaiting {
    Launch,
    Unit,
    Pause,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunStats {
    pub queued: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    phase: RunPhase,
    queue: WorkQueue,
    in_flight: Option<QueryUnit>,
    awaiting: Option<Awaiting>,
    cancel_requested: bool,
    launch_error: Option<String>,
    stats: RunStats,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Units not yet started.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn in_flight(&self) -> Option<&QueryUnit> {
        self.in_flight.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_requested
    }

    /// Set when the backend failed to launch and the run was aborted.
    pub fn launch_error(&self) -> Option<&str> {
        self.launch_error.as_deref()
    }

    pub(crate) fn set_phase(&mut self, phase: RunPhase) {
        self.phase = phase;
        if phase != RunPhase::Running {
            self.awaiting = None;
        }
    }

    pub(crate) fn awaiting(&self) -> Option<Awaiting> {
        self.awaiting
    }

    pub(crate) fn set_awaiting(&mut self, awaiting: Awaiting) {
        self.awaiting = Some(awaiting);
    }

    pub(crate) fn load_queue(&mut self, queue: WorkQueue) {
        self.stats.queued = queue.len();
        self.queue = queue;
    }

    pub(crate) fn next_unit(&mut self) -> Option<QueryUnit> {
        let unit = self.queue.pop_front()?;
        self.in_flight = Some(unit.clone());
        Some(unit)
    }

    pub(crate) fn take_in_flight(&mut self, unit: &QueryUnit) -> bool {
        if self.in_flight.as_ref() == Some(unit) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub(crate) fn request_cancel(&mut self) {
        self.cancel_requested = true;
    }

    pub(crate) fn record_success(&mut self) {
        self.stats.succeeded += 1;
    }

    pub(crate) fn record_failure(&mut self) {
        self.stats.failed += 1;
    }

    pub(crate) fn abort_launch(&mut self, message: String) {
        self.launch_error = Some(message);
    }
}
