use pretty_assertions::assert_eq;
use searchinator_core::{
    update, Effect, EngineId, Msg, Outcome, QueryUnit, RunPhase, RunState, WorkQueue,
};

fn unit(engine: &str, query: &str) -> QueryUnit {
    QueryUnit::new(EngineId::from(engine), query)
}

/// Drives a fresh state up to the point where the first unit is executing.
fn running_with(units: Vec<QueryUnit>) -> (RunState, Vec<Effect>) {
    let (state, effects) = update(RunState::new(), Msg::BuildStarted);
    assert_eq!(effects, vec![Effect::BuildQueue]);
    assert_eq!(state.phase(), RunPhase::Building);

    let (state, effects) = update(state, Msg::QueueBuilt(WorkQueue::from(units)));
    assert_eq!(effects, vec![Effect::LaunchBackend]);
    assert_eq!(state.phase(), RunPhase::Running);

    update(state, Msg::BackendLaunched)
}

#[test]
fn success_appends_then_checkpoints_then_pauses() {
    let first = unit("bing", "nursery schools in Leeds");
    let second = unit("duckduckgo", "plumbers in York");
    let (state, effects) = running_with(vec![first.clone(), second.clone()]);
    assert_eq!(effects, vec![Effect::Execute(first.clone())]);
    assert_eq!(state.in_flight(), Some(&first));

    let links = vec!["https://a.example".to_string()];
    let (state, effects) = update(
        state,
        Msg::UnitFinished {
            unit: first.clone(),
            outcome: Outcome::Success(links.clone()),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::AppendResult {
                engine: EngineId::from("bing"),
                query: first.query().to_string(),
                links,
            },
            Effect::MarkCompleted {
                query: first.query().to_string(),
            },
            Effect::Pause,
        ]
    );

    let (state, effects) = update(state, Msg::PauseElapsed);
    assert_eq!(effects, vec![Effect::Execute(second.clone())]);
    assert_eq!(state.stats().succeeded, 1);
}

#[test]
fn failure_checkpoints_without_result_and_drains_at_end() {
    let only = unit("bing", "q");
    let (state, _) = running_with(vec![only.clone()]);

    let (state, effects) = update(
        state,
        Msg::UnitFinished {
            unit: only.clone(),
            outcome: Outcome::Failure("network error".into()),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::MarkCompleted { query: "q".into() },
            Effect::ReleaseBackend,
        ]
    );
    assert_eq!(state.phase(), RunPhase::Draining);
    assert_eq!(state.stats().failed, 1);

    let (state, effects) = update(state, Msg::BackendReleased);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), RunPhase::Done);
}

#[test]
fn empty_queue_finishes_without_backend() {
    let (state, _) = update(RunState::new(), Msg::BuildStarted);
    let (state, effects) = update(state, Msg::QueueBuilt(WorkQueue::new()));
    assert!(effects.is_empty());
    assert_eq!(state.phase(), RunPhase::Done);
    assert_eq!(state.stats().queued, 0);
}

#[test]
fn launch_failure_is_terminal() {
    let (state, _) = update(RunState::new(), Msg::BuildStarted);
    let (state, _) = update(state, Msg::QueueBuilt(WorkQueue::from(vec![unit("bing", "q")])));
    let (state, effects) = update(state, Msg::BackendLaunchFailed("no browser".into()));
    assert!(effects.is_empty());
    assert_eq!(state.phase(), RunPhase::Done);
    assert_eq!(state.launch_error(), Some("no browser"));
    assert_eq!(state.remaining(), 1);
}

#[test]
fn cancel_during_pause_drains_immediately() {
    let first = unit("bing", "a");
    let (state, _) = running_with(vec![first.clone(), unit("bing", "b")]);
    let (state, _) = update(
        state,
        Msg::UnitFinished {
            unit: first,
            outcome: Outcome::Success(Vec::new()),
        },
    );

    let (state, effects) = update(state, Msg::CancelRequested);
    assert_eq!(effects, vec![Effect::ReleaseBackend]);
    assert_eq!(state.phase(), RunPhase::Draining);
    assert!(state.is_cancelled());
    assert_eq!(state.remaining(), 1);

    // A late pause completion is ignored.
    let (state, effects) = update(state, Msg::PauseElapsed);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), RunPhase::Draining);
}

#[test]
fn cancel_while_unit_in_flight_lets_it_finish_consistently() {
    let first = unit("bing", "a");
    let (state, _) = running_with(vec![first.clone(), unit("bing", "b")]);

    let (state, effects) = update(state, Msg::CancelRequested);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), RunPhase::Running);

    let (state, effects) = update(
        state,
        Msg::UnitFinished {
            unit: first,
            outcome: Outcome::Success(vec!["https://a.example".into()]),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::AppendResult {
                engine: EngineId::from("bing"),
                query: "a".into(),
                links: vec!["https://a.example".into()],
            },
            Effect::MarkCompleted { query: "a".into() },
            Effect::ReleaseBackend,
        ]
    );
    assert_eq!(state.phase(), RunPhase::Draining);
}

#[test]
fn cancel_during_launch_skips_all_units() {
    let (state, _) = update(RunState::new(), Msg::BuildStarted);
    let (state, _) = update(state, Msg::QueueBuilt(WorkQueue::from(vec![unit("bing", "q")])));
    let (state, effects) = update(state, Msg::CancelRequested);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::BackendLaunched);
    assert_eq!(effects, vec![Effect::ReleaseBackend]);
    assert_eq!(state.stats().processed(), 0);
}

#[test]
fn stale_unit_completion_is_ignored() {
    let first = unit("bing", "a");
    let (state, _) = running_with(vec![first]);
    let (state, effects) = update(
        state,
        Msg::UnitFinished {
            unit: unit("bing", "other"),
            outcome: Outcome::Success(Vec::new()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.stats().processed(), 0);
}
