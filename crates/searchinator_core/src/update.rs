use crate::state::Awaiting;
use crate::{Effect, Msg, Outcome, RunPhase, RunState};

/// Pure update function: applies a message to the run state and returns the
/// effects the driver must perform, in order.
///
/// Messages that do not fit the current phase are ignored.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match (state.phase(), msg) {
        (RunPhase::Idle, Msg::BuildStarted) => {
            state.set_phase(RunPhase::Building);
            vec![Effect::BuildQueue]
        }
        (RunPhase::Building, Msg::QueueBuilt(queue)) => {
            state.load_queue(queue);
            if state.is_cancelled() || !state.has_pending() {
                // Nothing to fetch; never start a backend.
                state.set_phase(RunPhase::Done);
                Vec::new()
            } else {
                state.set_phase(RunPhase::Running);
                state.set_awaiting(Awaiting::Launch);
                vec![Effect::LaunchBackend]
            }
        }
        (RunPhase::Running, Msg::BackendLaunched)
            if state.awaiting() == Some(Awaiting::Launch) =>
        {
            advance(&mut state)
        }
        (RunPhase::Running, Msg::BackendLaunchFailed(message))
            if state.awaiting() == Some(Awaiting::Launch) =>
        {
            state.abort_launch(message);
            state.set_phase(RunPhase::Done);
            Vec::new()
        }
        (RunPhase::Running, Msg::UnitFinished { unit, outcome })
            if state.awaiting() == Some(Awaiting::Unit) =>
        {
            if !state.take_in_flight(&unit) {
                return (state, Vec::new());
            }
            let mut effects = Vec::with_capacity(3);
            // The result is recorded before the checkpoint so a crash in
            // between re-runs the unit instead of losing its links.
            match outcome {
                Outcome::Success(links) => {
                    state.record_success();
                    effects.push(Effect::AppendResult {
                        engine: unit.engine().clone(),
                        query: unit.query().to_string(),
                        links,
                    });
                }
                Outcome::Failure(_) => state.record_failure(),
            }
            effects.push(Effect::MarkCompleted {
                query: unit.query().to_string(),
            });
            if state.has_pending() && !state.is_cancelled() {
                state.set_awaiting(Awaiting::Pause);
                effects.push(Effect::Pause);
            } else {
                state.set_phase(RunPhase::Draining);
                effects.push(Effect::ReleaseBackend);
            }
            effects
        }
        (RunPhase::Running, Msg::PauseElapsed) if state.awaiting() == Some(Awaiting::Pause) => {
            advance(&mut state)
        }
        (phase, Msg::CancelRequested) => {
            state.request_cancel();
            match phase {
                RunPhase::Idle => {
                    state.set_phase(RunPhase::Done);
                    Vec::new()
                }
                RunPhase::Running if state.awaiting() == Some(Awaiting::Pause) => {
                    state.set_phase(RunPhase::Draining);
                    vec![Effect::ReleaseBackend]
                }
                // Building finishes its queue, launch and in-flight units run to
                // completion; the flag is checked at the next boundary.
                _ => Vec::new(),
            }
        }
        (RunPhase::Draining, Msg::BackendReleased) => {
            state.set_phase(RunPhase::Done);
            Vec::new()
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn advance(state: &mut RunState) -> Vec<Effect> {
    if !state.is_cancelled() {
        if let Some(unit) = state.next_unit() {
            state.set_awaiting(Awaiting::Unit);
            return vec![Effect::Execute(unit)];
        }
    }
    state.set_phase(RunPhase::Draining);
    vec![Effect::ReleaseBackend]
}
