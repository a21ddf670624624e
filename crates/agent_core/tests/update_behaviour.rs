use agent_core::{update, Effect, Msg, Stage, TrackerState, TransitionPolicy};
use pretty_assertions::assert_eq;

fn init_logging() {
    agent_logging::initialize_for_tests();
}

fn feed(state: TrackerState, frames: &[&str]) -> (TrackerState, Vec<Effect>) {
    frames.iter().fold((state, Vec::new()), |(state, mut all), frame| {
        let (next, effects) = update(state, Msg::FrameReceived(frame.to_string()));
        all.extend(effects);
        (next, all)
    })
}

fn fresh() -> TrackerState {
    TrackerState::new("task-1", TransitionPolicy::Permissive)
}

#[test]
fn station_fetch_scenario_reaches_finish() {
    init_logging();
    let (state, effects) = feed(
        fresh(),
        &[
            r#"{"step":"interpret","status":"start"}"#,
            r#"{"msg":"fetching station 441000205"}"#,
            r#"{"step":"fetch","status":"done"}"#,
            r#"{"step":"finish","status":"done"}"#,
        ],
    );

    let view = state.view();
    assert_eq!(view.stage, Stage::Finish);
    assert_eq!(view.percent, 100);
    assert_eq!(view.log, vec!["fetching station 441000205".to_string()]);
    assert!(view.is_live());
    assert!(effects.is_empty());
}

#[test]
fn percent_tracks_each_reported_step() {
    init_logging();
    let expected = [
        ("interpret", 0),
        ("fetch", 25),
        ("convert", 50),
        ("viz", 75),
        ("finish", 100),
    ];
    for (step, percent) in expected {
        let frame = format!(r#"{{"step":"{step}","status":"started"}}"#);
        let (state, _) = update(fresh(), Msg::FrameReceived(frame));
        assert_eq!(state.view().percent, percent, "step {step}");
    }
}

#[test]
fn step_without_status_does_not_move_the_pointer() {
    init_logging();
    let (state, _) = feed(
        fresh(),
        &[r#"{"step":"viz"}"#, r#"{"status":"done"}"#, r#"{"step":"","status":"done"}"#],
    );
    assert_eq!(state.current(), Stage::Interpret);
}

#[test]
fn log_keeps_arrival_order_including_messages_on_transitions() {
    init_logging();
    let (state, _) = feed(
        fresh(),
        &[
            r#"{"msg":"one"}"#,
            r#"{"step":"fetch","status":"start","msg":"two"}"#,
            "keep-alive",
            r#"{"msg":"three"}"#,
            r#"{"msg":"one"}"#,
        ],
    );
    assert_eq!(state.log(), ["one", "two", "three", "one"]);
    assert_eq!(state.current(), Stage::Fetch);
}

#[test]
fn permissive_policy_follows_server_regressions() {
    init_logging();
    let (state, _) = feed(
        fresh(),
        &[
            r#"{"step":"viz","status":"start"}"#,
            r#"{"step":"fetch","status":"retry"}"#,
        ],
    );
    assert_eq!(state.current(), Stage::Fetch);
    assert_eq!(state.view().percent, 25);
}

#[test]
fn strict_policy_ignores_regressions_but_keeps_messages() {
    init_logging();
    let state = TrackerState::new("task-1", TransitionPolicy::Strict);
    let (state, _) = feed(
        state,
        &[
            r#"{"step":"viz","status":"start"}"#,
            r#"{"step":"fetch","status":"retry","msg":"retrying fetch"}"#,
            r#"{"step":"finish","status":"done"}"#,
        ],
    );
    assert_eq!(state.current(), Stage::Finish);
    assert_eq!(state.log(), ["retrying fetch"]);
}

#[test]
fn unknown_stage_is_ignored_without_losing_message() {
    init_logging();
    let (state, _) = feed(
        fresh(),
        &[
            r#"{"step":"convert","status":"start"}"#,
            r#"{"step":"upload","status":"start","msg":"uploading"}"#,
        ],
    );
    assert_eq!(state.current(), Stage::Convert);
    assert_eq!(state.log(), ["uploading"]);
}

#[test]
fn non_structured_frames_are_ignored_silently() {
    init_logging();
    let (mut state, _) = feed(fresh(), &["ping", "", "event: finish", "[1,2]"]);
    let view = state.view();
    assert_eq!(view.stage, Stage::Interpret);
    assert!(view.log.is_empty());
    assert_eq!(view.decode_errors, 0);
    assert!(!state.consume_dirty());
}

#[test]
fn malformed_frame_keeps_tracking_and_log() {
    init_logging();
    let (state, effects) = feed(
        fresh(),
        &[
            r#"{"step":"fetch","status":"start","msg":"before"}"#,
            r#"{"step": "convert", "#,
            r#"{"step":"viz","status":}"#,
            r#"{"msg":"after"}"#,
        ],
    );
    let view = state.view();
    assert!(view.is_live());
    assert!(effects.is_empty());
    assert_eq!(view.decode_errors, 2);
    assert!(matches!(
        view.last_error,
        Some(agent_core::StreamError::Decode(_))
    ));
    assert_eq!(view.log, vec!["before".to_string(), "after".to_string()]);
    assert_eq!(view.stage, Stage::Fetch);
}

#[test]
fn wrongly_typed_fields_do_not_discard_the_rest_of_the_frame() {
    init_logging();
    let (state, _) = feed(
        fresh(),
        &[
            r#"{"step":"fetch","status":"done","msg":42}"#,
            r#"{"step":["viz"],"status":"start","msg":"still logged"}"#,
            r#"{"step":"convert","status":null}"#,
        ],
    );
    let view = state.view();
    assert_eq!(view.stage, Stage::Fetch);
    assert_eq!(view.log, vec!["still logged".to_string()]);
    assert_eq!(view.decode_errors, 0);
}

#[test]
fn frame_the_transport_could_not_decode_is_recoverable() {
    init_logging();
    let (state, _) = feed(fresh(), &[r#"{"step":"fetch","status":"start"}"#]);
    let (state, effects) = update(
        state,
        Msg::FrameMalformed("invalid utf-8 sequence".to_string()),
    );
    assert!(effects.is_empty());
    let (state, _) = feed(
        state,
        &[r#"{"msg":"after"}"#, r#"{"step":"finish","status":"done"}"#],
    );

    let view = state.view();
    assert!(view.is_live());
    assert_eq!(view.decode_errors, 1);
    assert_eq!(view.stage, Stage::Finish);
    assert_eq!(view.log, vec!["after".to_string()]);
    assert_eq!(
        view.last_error,
        Some(agent_core::StreamError::Decode(
            "invalid utf-8 sequence".to_string()
        ))
    );
}

#[test]
fn dirty_flag_marks_changes_once() {
    init_logging();
    let (mut state, _) = feed(fresh(), &[r#"{"step":"fetch","status":"start"}"#]);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}
