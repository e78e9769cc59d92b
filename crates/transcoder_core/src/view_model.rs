use crate::{PreviewBinding, SessionPhase};

/// What the single action button currently does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionButton {
    /// Engine not loaded (or failed to load); no controls are offered.
    #[default]
    Hidden,
    Transcode,
    Download,
}

impl ActionButton {
    pub fn label(self) -> Option<&'static str> {
        match self {
            ActionButton::Hidden => None,
            ActionButton::Transcode => Some("Transcode"),
            ActionButton::Download => Some("Download"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: SessionPhase,
    pub status: String,
    pub loading: bool,
    pub action: ActionButton,
    pub action_enabled: bool,
    pub input_name: Option<String>,
    pub output_len: Option<usize>,
    pub preview: Option<PreviewBinding>,
    pub dirty: bool,
}
