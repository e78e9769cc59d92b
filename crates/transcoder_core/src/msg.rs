use bytes::Bytes;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Session start; triggers the one engine bootstrap.
    SessionStarted,
    /// Engine bootstrap succeeded.
    EngineLoaded,
    /// Engine bootstrap failed. The session is unusable afterwards.
    EngineLoadFailed { reason: String },
    /// User picked a file.
    FileSelected(crate::InputFile),
    /// User clicked the single action button (Transcode or Download).
    ActionClicked,
    /// User asked for a transcode.
    TranscodeClicked,
    /// User asked to save the transcoded artifact.
    DownloadClicked,
    /// Engine progress for the in-flight transcode.
    EngineProgress { ratio: f64, elapsed_micros: i64 },
    /// Engine produced the output file for `attempt`.
    TranscodeFinished {
        attempt: crate::AttemptId,
        bytes: Bytes,
    },
    /// Write, exec or read failed for `attempt`.
    TranscodeFailed {
        attempt: crate::AttemptId,
        reason: String,
    },
    /// Session end; releases the live preview.
    Teardown,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
