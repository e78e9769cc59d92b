use bytes::Bytes;
use transcoder_core::{
    update, ActionButton, AppState, Effect, InputFile, Msg, SessionPhase, STATUS_COMPLETED,
    STATUS_IN_PROGRESS, STATUS_TRANSCODE_ERROR, STATUS_UPLOADED,
};

fn clip(name: &str, len: usize) -> InputFile {
    InputFile::new(name, Some("video/quicktime".to_string()), vec![3u8; len])
}

fn selected_state(file: InputFile) -> AppState {
    let (state, _) = update(AppState::new(), Msg::SessionStarted);
    let (state, _) = update(state, Msg::EngineLoaded);
    let (state, _) = update(state, Msg::FileSelected(file));
    state
}

fn start_transcode(state: AppState) -> (AppState, u64) {
    let (state, effects) = update(state, Msg::TranscodeClicked);
    let attempt = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::RunTranscode { attempt, .. } => Some(*attempt),
            _ => None,
        })
        .expect("run transcode effect");
    (state, attempt)
}

fn is_progress_status(status: &str) -> bool {
    let Some((percent, rest)) = status.split_once("% (transcoded time: ") else {
        return false;
    };
    let Some(seconds) = rest.strip_suffix(" s)") else {
        return false;
    };
    let Some((whole, fraction)) = percent.split_once('.') else {
        return false;
    };
    !whole.is_empty()
        && whole.chars().all(|c| c.is_ascii_digit())
        && fraction.len() == 2
        && fraction.chars().all(|c| c.is_ascii_digit())
        && !seconds.is_empty()
        && seconds.chars().all(|c| c.is_ascii_digit())
}

#[test]
fn full_session_scenario() {
    let input = clip("clip.mov", 5 * 1024 * 1024);
    let state = selected_state(input.clone());
    assert_eq!(state.status().current(), STATUS_UPLOADED);

    let (state, effects) = update(state, Msg::ActionClicked);
    assert_eq!(
        effects,
        vec![Effect::RunTranscode {
            attempt: 1,
            input: input.clone(),
        }]
    );
    assert_eq!(state.phase(), SessionPhase::Transcoding);
    assert_eq!(state.status().current(), STATUS_IN_PROGRESS);
    assert!(!state.view().action_enabled);

    let (state, _) = update(
        state,
        Msg::EngineProgress {
            ratio: 0.25,
            elapsed_micros: 3_200_000,
        },
    );
    assert_eq!(state.status().current(), "25.00% (transcoded time: 3 s)");
    assert!(is_progress_status(state.status().current()));

    let (state, _) = update(
        state,
        Msg::EngineProgress {
            ratio: 0.98765,
            elapsed_micros: 11_600_000,
        },
    );
    assert!(is_progress_status(state.status().current()));

    let (state, effects) = update(
        state,
        Msg::TranscodeFinished {
            attempt: 1,
            bytes: Bytes::from_static(b"mp4-bytes"),
        },
    );
    assert_eq!(state.phase(), SessionPhase::Complete);
    assert!(state.status().current().ends_with(STATUS_COMPLETED));
    let artifact = state.output().expect("artifact");
    assert_eq!(artifact.media_type(), "video/mp4");
    assert!(!artifact.is_empty());
    assert_eq!(
        effects.first(),
        Some(&Effect::ReleasePreview { preview: 1 })
    );
    assert_eq!(state.view().action, ActionButton::Download);

    let (_state, effects) = update(state, Msg::ActionClicked);
    match effects.as_slice() {
        [Effect::SaveArtifact { artifact }] => {
            assert_eq!(artifact.name(), "output.mp4");
            assert_eq!(artifact.bytes().as_ref(), b"mp4-bytes");
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn failed_transcode_keeps_artifact_absent_and_allows_retry() {
    let state = selected_state(clip("clip.mov", 16));
    let (state, attempt) = start_transcode(state);

    let (state, effects) = update(
        state,
        Msg::TranscodeFailed {
            attempt,
            reason: "write failed".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), SessionPhase::FileSelected);
    assert_eq!(state.status().current(), STATUS_TRANSCODE_ERROR);
    assert!(state.output().is_none());
    assert_eq!(state.preview().live().map(|b| b.id), Some(1));

    let (state, retry) = start_transcode(state);
    assert_eq!(retry, attempt + 1);
    let (state, _) = update(
        state,
        Msg::TranscodeFinished {
            attempt: retry,
            bytes: Bytes::from_static(b"ok"),
        },
    );
    assert_eq!(state.phase(), SessionPhase::Complete);
    assert_eq!(state.status().current(), STATUS_COMPLETED);
}

#[test]
fn execute_from_complete_is_ignored() {
    let state = selected_state(clip("clip.mov", 16));
    let (state, attempt) = start_transcode(state);
    let (state, _) = update(
        state,
        Msg::TranscodeFinished {
            attempt,
            bytes: Bytes::from_static(b"first"),
        },
    );
    let before = state.clone();

    let (state, effects) = update(state, Msg::TranscodeClicked);
    assert!(effects.is_empty());
    assert_eq!(state, before);
    assert_eq!(state.phase(), SessionPhase::Complete);
    assert_eq!(state.in_flight(), None);

    // The single action button only offers Download here.
    let (state, effects) = update(state, Msg::ActionClicked);
    assert!(matches!(effects.as_slice(), [Effect::SaveArtifact { .. }]));
    assert_eq!(state.phase(), SessionPhase::Complete);
}

#[test]
fn empty_engine_output_counts_as_failure() {
    let state = selected_state(clip("clip.mov", 16));
    let (state, attempt) = start_transcode(state);
    let (state, effects) = update(
        state,
        Msg::TranscodeFinished {
            attempt,
            bytes: Bytes::new(),
        },
    );

    assert!(effects.is_empty());
    assert!(state.output().is_none());
    assert_eq!(state.status().current(), STATUS_TRANSCODE_ERROR);
}

#[test]
fn stale_completion_is_ignored() {
    let state = selected_state(clip("clip.mov", 16));
    let (state, attempt) = start_transcode(state);

    let (state, effects) = update(
        state,
        Msg::TranscodeFinished {
            attempt: attempt + 7,
            bytes: Bytes::from_static(b"stale"),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), SessionPhase::Transcoding);
    assert_eq!(state.in_flight(), Some(attempt));
}

#[test]
fn progress_outside_transcode_is_ignored() {
    let state = selected_state(clip("clip.mov", 16));
    let (state, _) = update(
        state,
        Msg::EngineProgress {
            ratio: 0.5,
            elapsed_micros: 1_000_000,
        },
    );
    assert_eq!(state.status().current(), STATUS_UPLOADED);
}

#[test]
fn requests_during_transcode_are_rejected() {
    let state = selected_state(clip("clip.mov", 16));
    let (state, _attempt) = start_transcode(state);
    let revision = state.status().revision();

    let (state, effects) = update(state, Msg::FileSelected(clip("other.mov", 16)));
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::TranscodeClicked);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::DownloadClicked);
    assert!(effects.is_empty());

    assert_eq!(state.input().map(|f| f.name.as_str()), Some("clip.mov"));
    assert_eq!(state.phase(), SessionPhase::Transcoding);
    assert_eq!(state.status().revision(), revision);
}

#[test]
fn download_without_artifact_is_noop() {
    let state = selected_state(clip("clip.mov", 16));
    let before = state.clone();
    let (state, effects) = update(state, Msg::DownloadClicked);

    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn download_twice_saves_identical_content_twice() {
    let state = selected_state(clip("clip.mov", 16));
    let (state, attempt) = start_transcode(state);
    let (state, _) = update(
        state,
        Msg::TranscodeFinished {
            attempt,
            bytes: Bytes::from_static(b"payload"),
        },
    );

    let (state, first) = update(state, Msg::DownloadClicked);
    let (_state, second) = update(state, Msg::DownloadClicked);

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}
