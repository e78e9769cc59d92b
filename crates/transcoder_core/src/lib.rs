//! Transcoder core: pure session state machine and view-model helpers.
mod effect;
mod file;
mod msg;
mod preview;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use file::{InputFile, OutputArtifact, OUTPUT_FILE_NAME, OUTPUT_MEDIA_TYPE};
pub use msg::Msg;
pub use preview::{PreviewBinding, PreviewId, PreviewSlot, PreviewSource};
pub use state::{AppState, AttemptId, SessionPhase};
pub use status::{
    format_progress, StatusLine, STATUS_COMPLETED, STATUS_EMPTY_FILE, STATUS_INIT_FAILED,
    STATUS_IN_PROGRESS, STATUS_READY, STATUS_SELECT_FILE_FIRST, STATUS_TRANSCODE_ERROR,
    STATUS_UPLOADED,
};
pub use update::update;
pub use view_model::{ActionButton, AppViewModel};
