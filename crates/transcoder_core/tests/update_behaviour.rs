use std::sync::Once;

use transcoder_core::{
    update, ActionButton, AppState, Effect, InputFile, Msg, SessionPhase, STATUS_INIT_FAILED,
    STATUS_READY, STATUS_SELECT_FILE_FIRST, STATUS_UPLOADED,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn clip(name: &str) -> InputFile {
    InputFile::new(name, Some("video/quicktime".to_string()), vec![7u8; 64])
}

fn ready_state() -> AppState {
    let (state, _) = update(AppState::new(), Msg::SessionStarted);
    let (state, _) = update(state, Msg::EngineLoaded);
    state
}

#[test]
fn session_start_requests_bootstrap_once() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::SessionStarted);
    assert_eq!(effects, vec![Effect::Bootstrap]);
    assert_eq!(state.phase(), SessionPhase::Bootstrapping);

    let (state, effects) = update(state, Msg::SessionStarted);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::EngineLoaded);
    let (_state, effects) = update(state, Msg::SessionStarted);
    assert!(effects.is_empty());
}

#[test]
fn engine_loaded_moves_to_ready() {
    init_logging();
    let mut state = ready_state();
    let view = state.view();

    assert_eq!(view.phase, SessionPhase::Ready);
    assert_eq!(view.status, STATUS_READY);
    assert!(!view.loading);
    assert_eq!(view.action, ActionButton::Transcode);
    assert!(state.consume_dirty());
}

#[test]
fn ready_is_unreachable_without_bootstrap() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::EngineLoaded);

    assert!(effects.is_empty());
    assert_eq!(state.phase(), SessionPhase::Bootstrapping);
    assert!(state.view().loading);
    assert_eq!(state.view().action, ActionButton::Hidden);
}

#[test]
fn bootstrap_failure_is_terminal() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::SessionStarted);
    let (state, _) = update(
        state,
        Msg::EngineLoadFailed {
            reason: "network error".to_string(),
        },
    );
    assert_eq!(state.phase(), SessionPhase::Failed);
    assert_eq!(state.status().current(), STATUS_INIT_FAILED);

    // A late success report does not revive the session.
    let (state, _) = update(state, Msg::EngineLoaded);
    assert_eq!(state.phase(), SessionPhase::Failed);

    let (state, effects) = update(state, Msg::FileSelected(clip("clip.mov")));
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::TranscodeClicked);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::ActionClicked);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::SessionStarted);
    assert!(effects.is_empty());

    assert_eq!(state.phase(), SessionPhase::Failed);
    assert_eq!(state.status().current(), STATUS_INIT_FAILED);
    assert_eq!(state.view().action, ActionButton::Hidden);
}

#[test]
fn transcode_without_file_asks_for_one() {
    init_logging();
    let (state, effects) = update(ready_state(), Msg::TranscodeClicked);

    assert!(effects.is_empty());
    assert_eq!(state.phase(), SessionPhase::Ready);
    assert_eq!(state.status().current(), STATUS_SELECT_FILE_FIRST);
}

#[test]
fn file_selection_is_ignored_before_engine_loads() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::SessionStarted);
    let (state, effects) = update(state, Msg::FileSelected(clip("clip.mov")));

    assert!(effects.is_empty());
    assert!(state.input().is_none());
    assert_eq!(state.phase(), SessionPhase::Bootstrapping);
}

#[test]
fn select_file_sets_uploaded_status() {
    init_logging();
    let (state, effects) = update(ready_state(), Msg::FileSelected(clip("clip.mov")));
    let view = state.view();

    assert_eq!(view.phase, SessionPhase::FileSelected);
    assert_eq!(view.status, STATUS_UPLOADED);
    assert_eq!(view.input_name.as_deref(), Some("clip.mov"));
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::BindPreview { preview: 1, .. }));
}

#[test]
fn empty_file_is_rejected_and_keeps_previous_selection() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::FileSelected(clip("first.mov")));
    let empty = InputFile::new("empty.mov", Some("video/quicktime".to_string()), Vec::<u8>::new());

    let (state, effects) = update(state, Msg::FileSelected(empty));

    assert!(effects.is_empty());
    assert_eq!(state.input().map(|f| f.name.as_str()), Some("first.mov"));
    assert_eq!(state.status().current(), "selected file is empty");
}

#[test]
fn non_video_file_is_still_accepted() {
    init_logging();
    let file = InputFile::new("notes.txt", Some("text/plain".to_string()), vec![1u8; 8]);
    let (state, effects) = update(ready_state(), Msg::FileSelected(file));

    assert_eq!(state.phase(), SessionPhase::FileSelected);
    assert_eq!(effects.len(), 1);
}

#[test]
fn teardown_releases_preview_and_freezes_session() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::FileSelected(clip("clip.mov")));
    let (state, effects) = update(state, Msg::Teardown);

    assert_eq!(effects, vec![Effect::ReleasePreview { preview: 1 }]);
    assert!(state.preview().live().is_none());
    assert!(state.is_torn_down());

    let (state, effects) = update(state, Msg::Teardown);
    assert!(effects.is_empty());
    let (_state, effects) = update(state, Msg::FileSelected(clip("other.mov")));
    assert!(effects.is_empty());
}

#[test]
fn teardown_without_preview_emits_nothing() {
    init_logging();
    let (state, effects) = update(ready_state(), Msg::Teardown);
    assert!(effects.is_empty());
    assert!(state.is_torn_down());
}
