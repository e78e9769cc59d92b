use bytes::Bytes;

use crate::view_model::{ActionButton, AppViewModel};
use crate::{Effect, InputFile, OutputArtifact, PreviewSlot, PreviewSource, StatusLine};

pub type AttemptId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Bootstrapping,
    Ready,
    FileSelected,
    Transcoding,
    Complete,
    /// Engine bootstrap failed; nothing else is reachable.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    phase: SessionPhase,
    bootstrap_requested: bool,
    torn_down: bool,
    input: Option<InputFile>,
    output: Option<OutputArtifact>,
    status: StatusLine,
    preview: PreviewSlot,
    last_attempt: AttemptId,
    in_flight: Option<AttemptId>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let action = match self.phase {
            SessionPhase::Bootstrapping | SessionPhase::Failed => ActionButton::Hidden,
            _ if self.output.is_some() => ActionButton::Download,
            _ => ActionButton::Transcode,
        };
        AppViewModel {
            phase: self.phase,
            status: self.status.current().to_string(),
            loading: self.phase == SessionPhase::Bootstrapping,
            action,
            action_enabled: self.phase != SessionPhase::Transcoding && !self.torn_down,
            input_name: self.input.as_ref().map(|file| file.name.clone()),
            output_len: self.output.as_ref().map(OutputArtifact::len),
            preview: self.preview.live(),
            dirty: self.dirty,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn input(&self) -> Option<&InputFile> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&OutputArtifact> {
        self.output.as_ref()
    }

    pub fn preview(&self) -> &PreviewSlot {
        &self.preview
    }

    pub fn in_flight(&self) -> Option<AttemptId> {
        self.in_flight
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn bootstrap_requested(&self) -> bool {
        self.bootstrap_requested
    }

    pub(crate) fn request_bootstrap(&mut self) {
        self.bootstrap_requested = true;
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.dirty = true;
        }
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>) {
        self.status.set(text);
        self.dirty = true;
    }

    /// Replaces the input, drops any artifact and rebinds the preview to the new file.
    pub(crate) fn select_input(&mut self, file: InputFile) -> Vec<Effect> {
        let effects = self.preview.rebind(
            PreviewSource::Input,
            file.bytes.clone(),
            file.media_type.clone(),
        );
        self.input = Some(file);
        self.output = None;
        self.dirty = true;
        effects
    }

    pub(crate) fn begin_attempt(&mut self) -> Option<(AttemptId, InputFile)> {
        let input = self.input.clone()?;
        self.last_attempt += 1;
        self.in_flight = Some(self.last_attempt);
        Some((self.last_attempt, input))
    }

    /// Clears the in-flight marker when `attempt` is the current one.
    pub(crate) fn settle_attempt(&mut self, attempt: AttemptId) -> bool {
        if self.in_flight == Some(attempt) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn store_output(&mut self, bytes: Bytes) -> Vec<Effect> {
        let artifact = OutputArtifact::new(bytes);
        let effects = self.preview.rebind(
            PreviewSource::Output,
            artifact.bytes().clone(),
            Some(artifact.media_type().to_string()),
        );
        self.output = Some(artifact);
        self.dirty = true;
        effects
    }

    pub(crate) fn tear_down(&mut self) -> Option<Effect> {
        self.torn_down = true;
        self.dirty = true;
        self.preview.release()
    }
}
