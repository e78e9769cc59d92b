use bytes::Bytes;

use crate::{AttemptId, InputFile, OutputArtifact, PreviewId, PreviewSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the engine resources and load the engine. Emitted once per session.
    Bootstrap,
    /// Create a revocable preview reference for `payload`.
    BindPreview {
        preview: PreviewId,
        source: PreviewSource,
        payload: Bytes,
        media_type: Option<String>,
    },
    /// Revoke a preview reference created by an earlier `BindPreview`.
    ReleasePreview { preview: PreviewId },
    /// Write the input into the engine, run it and read the result back.
    RunTranscode { attempt: AttemptId, input: InputFile },
    /// Save the artifact to disk under its output name.
    SaveArtifact { artifact: OutputArtifact },
}
