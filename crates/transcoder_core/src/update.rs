use crate::{
    format_progress, AppState, Effect, Msg, SessionPhase, STATUS_COMPLETED, STATUS_EMPTY_FILE,
    STATUS_INIT_FAILED, STATUS_IN_PROGRESS, STATUS_READY, STATUS_SELECT_FILE_FIRST,
    STATUS_TRANSCODE_ERROR, STATUS_UPLOADED,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.is_torn_down() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::SessionStarted => {
            if state.bootstrap_requested() {
                Vec::new()
            } else {
                state.request_bootstrap();
                vec![Effect::Bootstrap]
            }
        }
        Msg::EngineLoaded => {
            if state.phase() == SessionPhase::Bootstrapping && state.bootstrap_requested() {
                state.set_phase(SessionPhase::Ready);
                state.set_status(STATUS_READY);
            }
            Vec::new()
        }
        Msg::EngineLoadFailed { .. } => {
            if state.phase() == SessionPhase::Bootstrapping && state.bootstrap_requested() {
                state.set_phase(SessionPhase::Failed);
                state.set_status(STATUS_INIT_FAILED);
            }
            Vec::new()
        }
        Msg::FileSelected(file) => match state.phase() {
            SessionPhase::Ready | SessionPhase::FileSelected | SessionPhase::Complete => {
                if file.is_empty() {
                    state.set_status(STATUS_EMPTY_FILE);
                    Vec::new()
                } else {
                    let effects = state.select_input(file);
                    state.set_phase(SessionPhase::FileSelected);
                    state.set_status(STATUS_UPLOADED);
                    effects
                }
            }
            // Intake is closed until the engine is up, after a failed bootstrap,
            // and while a transcode is in flight.
            SessionPhase::Bootstrapping | SessionPhase::Failed | SessionPhase::Transcoding => {
                Vec::new()
            }
        },
        Msg::ActionClicked => {
            let next = if state.output().is_some() {
                Msg::DownloadClicked
            } else {
                Msg::TranscodeClicked
            };
            return update(state, next);
        }
        Msg::TranscodeClicked => match state.phase() {
            SessionPhase::Ready => {
                state.set_status(STATUS_SELECT_FILE_FIRST);
                Vec::new()
            }
            SessionPhase::FileSelected => match state.begin_attempt() {
                Some((attempt, input)) => {
                    state.set_phase(SessionPhase::Transcoding);
                    state.set_status(STATUS_IN_PROGRESS);
                    vec![Effect::RunTranscode { attempt, input }]
                }
                None => {
                    state.set_status(STATUS_SELECT_FILE_FIRST);
                    Vec::new()
                }
            },
            // Once an artifact exists the only action offered is Download.
            SessionPhase::Bootstrapping
            | SessionPhase::Transcoding
            | SessionPhase::Complete
            | SessionPhase::Failed => Vec::new(),
        },
        Msg::DownloadClicked => match (state.phase(), state.output()) {
            (SessionPhase::Transcoding, _) | (_, None) => Vec::new(),
            (_, Some(artifact)) => vec![Effect::SaveArtifact {
                artifact: artifact.clone(),
            }],
        },
        Msg::EngineProgress {
            ratio,
            elapsed_micros,
        } => {
            if state.phase() == SessionPhase::Transcoding {
                state.set_status(format_progress(ratio, elapsed_micros));
            }
            Vec::new()
        }
        Msg::TranscodeFinished { attempt, bytes } => {
            if !state.settle_attempt(attempt) {
                return (state, Vec::new());
            }
            if bytes.is_empty() {
                fail_attempt(&mut state);
                Vec::new()
            } else {
                let effects = state.store_output(bytes);
                state.set_phase(SessionPhase::Complete);
                state.set_status(STATUS_COMPLETED);
                effects
            }
        }
        Msg::TranscodeFailed { attempt, .. } => {
            if state.settle_attempt(attempt) {
                fail_attempt(&mut state);
            }
            Vec::new()
        }
        Msg::Teardown => state.tear_down().into_iter().collect(),
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Keeps the selected input so the user can retry.
fn fail_attempt(state: &mut AppState) {
    state.set_phase(SessionPhase::FileSelected);
    state.set_status(STATUS_TRANSCODE_ERROR);
}
