//! Transcoder engine: the transcoding capability, its resource bootstrap and
//! the worker that runs engine calls off the UI thread.
mod blob;
mod capability;
mod engine;
mod fetch;
mod persist;
mod process;
mod progress;
mod settings;
mod types;

pub use blob::{Blob, BlobRegistry, BlobUrl};
pub use capability::{transcode_argv, ChannelListener, EngineListener, LoadConfig, TranscodeEngine};
pub use engine::EngineHandle;
pub use fetch::{fetch_to_blob, sha256_hex, FetchOutput, Fetcher, ReqwestFetcher};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use process::ProcessEngine;
pub use progress::{parse_duration_line, ProgressParser, ProgressTick};
pub use settings::{
    Distribution, EngineSettings, FetchSettings, BINARY_MEDIA_TYPE, BINARY_RESOURCE,
    DEFAULT_DISTRIBUTION_BASE_URL, DEFAULT_ENGINE_VERSION, PROGRAM_MEDIA_TYPE, PROGRAM_RESOURCE,
};
pub use types::{AttemptId, EngineError, EngineEvent, FailureKind};
