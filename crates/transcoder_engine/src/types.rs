use std::fmt;

use bytes::Bytes;

pub type AttemptId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Fractional completion and elapsed engine time of the running exec.
    Progress { ratio: f64, elapsed_micros: i64 },
    /// Free-text diagnostic line from the engine.
    Log { message: String },
    /// Outcome of the one bootstrap.
    Loaded(Result<(), EngineError>),
    /// Output bytes of a transcode attempt, or why it failed.
    TranscodeCompleted {
        attempt: AttemptId,
        result: Result<Bytes, EngineError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: FailureKind,
    pub message: String,
}

impl EngineError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::new(FailureKind::Io, err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    DigestMismatch { resource: String },
    Network,
    UnknownBlob,
    Incompatible,
    NotLoaded,
    InvalidFileName,
    MissingFile { name: String },
    ExecFailed { code: Option<i32> },
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::DigestMismatch { resource } => {
                write!(f, "digest mismatch for {resource}")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::UnknownBlob => write!(f, "unknown blob reference"),
            FailureKind::Incompatible => write!(f, "incompatible engine binary"),
            FailureKind::NotLoaded => write!(f, "engine not loaded"),
            FailureKind::InvalidFileName => write!(f, "invalid file name"),
            FailureKind::MissingFile { name } => write!(f, "no such file {name}"),
            FailureKind::ExecFailed { code: Some(code) } => {
                write!(f, "engine exited with status {code}")
            }
            FailureKind::ExecFailed { code: None } => write!(f, "engine terminated by signal"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
