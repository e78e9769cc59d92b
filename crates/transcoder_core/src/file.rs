use bytes::Bytes;

/// Name of the file the engine writes and the name used when saving it.
pub const OUTPUT_FILE_NAME: &str = "output.mp4";
pub const OUTPUT_MEDIA_TYPE: &str = "video/mp4";

/// User supplied payload, owned by the session until another file is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub media_type: Option<String>,
    pub bytes: Bytes,
}

impl InputFile {
    pub fn new(name: impl Into<String>, media_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Advisory only; the engine is the final judge of what it can decode.
    pub fn is_video(&self) -> bool {
        self.media_type
            .as_deref()
            .is_some_and(|mt| mt.to_ascii_lowercase().starts_with("video/"))
    }
}

/// Transcoded result. Always named `output.mp4` with media type `video/mp4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    bytes: Bytes,
}

impl OutputArtifact {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        OUTPUT_FILE_NAME
    }

    pub fn media_type(&self) -> &'static str {
        OUTPUT_MEDIA_TYPE
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
