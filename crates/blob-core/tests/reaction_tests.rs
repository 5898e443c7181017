use blob_core::{PresetTable, ReactionError, ReactionMachine, ReactionRequest};

fn make_machine() -> ReactionMachine {
    ReactionMachine::new(PresetTable::builtin()).expect("builtin table has idle")
}

#[test]
fn initial_state_is_idle_and_silent() {
    let machine = make_machine();
    assert_eq!(machine.active_preset(), "idle");
    assert_eq!(machine.active_emotion(), None);
    assert!(!machine.speech_active());
    assert!(!machine.has_pending_reversion());
}

#[test]
fn table_without_idle_is_rejected() {
    let err = ReactionMachine::new(PresetTable::from_presets(Vec::new())).unwrap_err();
    assert_eq!(err, ReactionError::UnknownPreset("idle".to_string()));
}

#[test]
fn unknown_preset_errors_and_preserves_state() {
    let mut machine = make_machine();
    machine
        .trigger(
            &ReactionRequest::preset("thinking")
                .with_emotion("curious")
                .with_duration_ms(1000),
            0.0,
        )
        .unwrap();
    let before = machine.snapshot();

    let err = machine
        .trigger(&ReactionRequest::preset("nonexistent"), 0.1)
        .unwrap_err();
    assert_eq!(err, ReactionError::UnknownPreset("nonexistent".to_string()));

    // No partial application: the snapshot is unchanged, including revision,
    // and the pending timer still fires on schedule.
    assert_eq!(machine.snapshot(), before);
    assert!(machine.has_pending_reversion());
    machine.tick(1.1);
    assert_eq!(machine.active_preset(), "idle");
}

#[test]
fn retriggering_active_preset_is_idempotent() {
    let mut machine = make_machine();
    let req = ReactionRequest::preset("thinking").with_emotion("curious");
    machine.trigger(&req, 0.0).unwrap();
    machine.trigger(&req, 0.5).unwrap();
    assert_eq!(machine.active_preset(), "thinking");
    assert_eq!(machine.active_emotion(), Some("curious"));
    assert!(!machine.has_pending_reversion());
}

#[test]
fn second_trigger_replaces_pending_timer() {
    let mut machine = make_machine();
    machine
        .trigger(&ReactionRequest::preset("thinking").with_duration_ms(1000), 0.0)
        .unwrap();
    machine
        .trigger(&ReactionRequest::preset("surprised").with_duration_ms(2000), 0.1)
        .unwrap();
    assert!(machine.has_pending_reversion());

    // The first timer would have fired at 1.0; it was cancelled.
    machine.tick(1.05);
    assert_eq!(machine.active_preset(), "surprised");

    machine.tick(2.2);
    assert_eq!(machine.active_preset(), "idle");
    assert_eq!(machine.active_emotion(), None);
}

#[test]
fn timer_reverts_to_idle_when_speech_inactive() {
    let mut machine = make_machine();
    machine
        .trigger(
            &ReactionRequest::preset("listening")
                .with_emotion("attentive")
                .with_duration_ms(1000),
            0.0,
        )
        .unwrap();
    machine.tick(0.5);
    assert_eq!(machine.active_preset(), "listening");

    machine.tick(1.0);
    assert_eq!(machine.active_preset(), "idle");
    assert_eq!(machine.active_emotion(), None);
    assert!(!machine.has_pending_reversion());
}

#[test]
fn live_speech_wins_over_a_stale_timer() {
    let mut machine = make_machine();
    machine
        .trigger(&ReactionRequest::preset("thinking").with_duration_ms(1000), 0.0)
        .unwrap();
    machine.report_speech_start(0.2);
    assert_eq!(machine.active_preset(), "thinking", "emotional preset preserved");

    machine.tick(1.0);
    assert_eq!(machine.active_preset(), "speaking", "timer must not reach idle");
    assert!(
        !machine.has_pending_reversion(),
        "the fired timer must not reschedule itself"
    );
}

#[test]
fn speaking_and_idle_targets_never_schedule() {
    let mut machine = make_machine();
    machine
        .trigger(&ReactionRequest::preset("speaking").with_duration_ms(1000), 0.0)
        .unwrap();
    assert!(!machine.has_pending_reversion());

    machine
        .trigger(&ReactionRequest::preset("idle").with_duration_ms(1000), 0.1)
        .unwrap();
    assert!(!machine.has_pending_reversion());
}

#[test]
fn speech_start_overrides_idle_and_listening_only() {
    let mut machine = make_machine();
    machine.report_speech_start(0.0);
    assert_eq!(machine.active_preset(), "speaking");
    machine.report_speech_stop();

    machine
        .trigger(&ReactionRequest::preset("listening"), 1.0)
        .unwrap();
    machine.report_speech_start(1.1);
    assert_eq!(machine.active_preset(), "speaking");
    machine.report_speech_stop();

    machine
        .trigger(&ReactionRequest::preset("surprised").with_emotion("excited"), 2.0)
        .unwrap();
    machine.report_speech_start(2.1);
    assert_eq!(machine.active_preset(), "surprised");
    assert_eq!(machine.active_emotion(), Some("excited"));
}

#[test]
fn reassert_tick_restores_speaking_after_drift() {
    let mut machine = make_machine();
    machine.report_speech_start(0.0);
    assert_eq!(machine.active_preset(), "speaking");

    machine
        .trigger(&ReactionRequest::preset("listening"), 0.1)
        .unwrap();
    assert_eq!(machine.active_preset(), "listening");

    machine.tick(0.3);
    assert_eq!(machine.active_preset(), "listening", "cadence not yet due");

    machine.tick(0.55);
    assert_eq!(machine.active_preset(), "speaking");
}

#[test]
fn reassert_tick_preserves_emotional_presets() {
    let mut machine = make_machine();
    machine.report_speech_start(0.0);
    machine
        .trigger(&ReactionRequest::preset("surprised").with_intensity(1.0), 0.1)
        .unwrap();

    machine.tick(0.6);
    machine.tick(1.2);
    machine.tick(1.8);
    assert_eq!(
        machine.active_preset(),
        "surprised",
        "cadence only overrides idle/listening"
    );
}

#[test]
fn reassert_cadence_dies_with_speech() {
    let mut machine = make_machine();
    machine.report_speech_start(0.0);
    machine.report_speech_stop();
    machine
        .trigger(&ReactionRequest::preset("listening"), 0.1)
        .unwrap();

    machine.tick(5.0);
    assert_eq!(machine.active_preset(), "listening", "no posthumous re-assert");
}

#[test]
fn speech_stop_then_idle_always_lands_idle() {
    let mut machine = make_machine();
    machine.report_speech_start(0.0);
    machine
        .trigger(&ReactionRequest::preset("surprised").with_emotion("excited"), 0.2)
        .unwrap();

    machine.report_speech_stop();
    assert!(!machine.has_pending_reversion());
    machine.trigger(&ReactionRequest::preset("idle"), 0.3).unwrap();
    assert_eq!(machine.active_preset(), "idle");
    assert_eq!(machine.active_emotion(), None);

    machine.tick(10.0);
    assert_eq!(machine.active_preset(), "idle");
}

#[test]
fn idle_request_during_speech_is_deflected_to_speaking() {
    let mut machine = make_machine();
    machine.report_speech_start(0.0);
    machine.trigger(&ReactionRequest::preset("idle"), 0.1).unwrap();
    assert_eq!(
        machine.active_preset(),
        "speaking",
        "machine never goes idle while speech is active"
    );
}

#[test]
fn cancelled_timer_never_fires() {
    let mut machine = make_machine();
    machine
        .trigger(&ReactionRequest::preset("thinking").with_duration_ms(500), 0.0)
        .unwrap();
    machine
        .trigger(&ReactionRequest::preset("speaking"), 0.1)
        .unwrap();
    assert!(!machine.has_pending_reversion());

    machine.tick(10.0);
    assert_eq!(machine.active_preset(), "speaking", "stale callback executed");
}

#[test]
fn intensity_override_scales_strength_around_neutral() {
    let mut machine = make_machine();
    let base = PresetTable::builtin().get("thinking").unwrap().visual.strength;

    machine
        .trigger(&ReactionRequest::preset("thinking").with_intensity(0.5), 0.0)
        .unwrap();
    assert!((machine.snapshot().visual.strength - base).abs() < 1e-6);

    machine
        .trigger(&ReactionRequest::preset("thinking").with_intensity(1.0), 0.1)
        .unwrap();
    assert!((machine.snapshot().visual.strength - base * 1.5).abs() < 1e-6);

    machine
        .trigger(&ReactionRequest::preset("thinking").with_intensity(0.0), 0.2)
        .unwrap();
    assert!((machine.snapshot().visual.strength - base * 0.5).abs() < 1e-6);
}

#[test]
fn color_override_replaces_primary_only() {
    let mut machine = make_machine();
    let magenta = [1.0, 0.0, 1.0];
    machine
        .trigger(&ReactionRequest::preset("speaking").with_color(magenta), 0.0)
        .unwrap();
    let snapshot = machine.snapshot();
    let speaking = PresetTable::builtin().get("speaking").unwrap().visual.clone();
    assert_eq!(snapshot.visual.color1, magenta);
    assert_eq!(snapshot.visual.color2, speaking.color2);
    assert_eq!(snapshot.visual.color3, speaking.color3);

    // The next plain trigger restores the preset's own palette.
    machine
        .trigger(&ReactionRequest::preset("speaking"), 0.1)
        .unwrap();
    assert_eq!(machine.snapshot().visual.color1, speaking.color1);
}

#[test]
fn snapshot_revision_advances_on_transitions() {
    let mut machine = make_machine();
    let r0 = machine.snapshot().revision;
    machine
        .trigger(&ReactionRequest::preset("thinking"), 0.0)
        .unwrap();
    let r1 = machine.snapshot().revision;
    assert!(r1 > r0);

    machine.report_speech_start(0.1);
    assert!(machine.snapshot().revision > r1);
}
