use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{engine_diag, engine_error, engine_info, engine_warn};
use transcoder_core::{Effect, Msg, OutputArtifact, PreviewId, OUTPUT_FILE_NAME};
use transcoder_engine::{
    AtomicFileWriter, BlobRegistry, BlobUrl, EngineError, EngineEvent, EngineHandle, PersistError,
    ProcessEngine,
};

use super::config::AppConfig;

/// Executes core effects against the engine worker and the blob registry.
pub struct EffectRunner {
    engine: EngineHandle,
    blobs: BlobRegistry,
    previews: HashMap<PreviewId, BlobUrl>,
    downloads: AtomicFileWriter,
    saved: Vec<PathBuf>,
}

impl EffectRunner {
    pub fn new(config: &AppConfig) -> Result<Self, EngineError> {
        let blobs = BlobRegistry::new();
        let engine = Arc::new(ProcessEngine::new(blobs.clone())?);
        let handle = EngineHandle::new(config.engine_settings(), engine, blobs.clone())?;
        Ok(Self::with_engine(handle, blobs, config.output_dir.clone()))
    }

    pub fn with_engine(engine: EngineHandle, blobs: BlobRegistry, output_dir: PathBuf) -> Self {
        Self {
            engine,
            blobs,
            previews: HashMap::new(),
            downloads: AtomicFileWriter::new(output_dir),
            saved: Vec::new(),
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Bootstrap => {
                    engine_info!("Bootstrapping engine");
                    self.engine.bootstrap();
                }
                Effect::BindPreview {
                    preview,
                    source,
                    payload,
                    media_type,
                } => {
                    let url = self.blobs.create(payload, media_type);
                    engine_info!("Preview {} bound to {:?} at {}", preview, source, url);
                    if let Some(stale) = self.previews.insert(preview, url) {
                        engine_warn!("Preview {} was rebound; revoking {}", preview, stale);
                        self.blobs.revoke(&stale);
                    }
                }
                Effect::ReleasePreview { preview } => match self.previews.remove(&preview) {
                    Some(url) => {
                        self.blobs.revoke(&url);
                        engine_info!("Preview {} released", preview);
                    }
                    None => engine_warn!("Release for unknown preview {}", preview),
                },
                Effect::RunTranscode { attempt, input } => {
                    engine_info!(
                        "RunTranscode attempt={} name={} bytes={}",
                        attempt,
                        input.name,
                        input.bytes.len()
                    );
                    self.engine
                        .transcode(attempt, input.name, input.bytes, OUTPUT_FILE_NAME);
                }
                Effect::SaveArtifact { artifact } => match self.save(&artifact) {
                    Ok(path) => {
                        engine_info!("Saved {} bytes to {:?}", artifact.len(), path);
                        self.saved.push(path);
                    }
                    Err(err) => engine_error!("Failed to save {}: {}", artifact.name(), err),
                },
            }
        }
    }

    /// Drains pending engine events into session messages.
    pub fn poll_engine(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            msgs.extend(map_event(event));
        }
        msgs
    }

    pub fn preview_url(&self, preview: PreviewId) -> Option<&BlobUrl> {
        self.previews.get(&preview)
    }

    pub fn saved_paths(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Stops the engine worker; its sandbox is gone once this returns.
    pub fn shutdown(self) {
        self.engine.shutdown();
        engine_info!("Engine worker stopped");
    }

    /// Saves through a transient blob reference, distinct from the display
    /// preview, that is revoked before returning.
    fn save(&self, artifact: &OutputArtifact) -> Result<PathBuf, PersistError> {
        let transient = self.blobs.create(
            artifact.bytes().clone(),
            Some(artifact.media_type().to_string()),
        );
        let result = match self.blobs.resolve(&transient) {
            Some(blob) => self.downloads.write(artifact.name(), &blob.bytes),
            None => Err(PersistError::FileName(artifact.name().to_string())),
        };
        self.blobs.revoke(&transient);
        result
    }
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Progress {
            ratio,
            elapsed_micros,
        } => Some(Msg::EngineProgress {
            ratio,
            elapsed_micros,
        }),
        EngineEvent::Log { message } => {
            engine_diag!("{}", message);
            None
        }
        EngineEvent::Loaded(Ok(())) => Some(Msg::EngineLoaded),
        EngineEvent::Loaded(Err(err)) => {
            engine_error!("Engine failed to load: {}", err);
            Some(Msg::EngineLoadFailed {
                reason: err.to_string(),
            })
        }
        EngineEvent::TranscodeCompleted {
            attempt,
            result: Ok(bytes),
        } => Some(Msg::TranscodeFinished { attempt, bytes }),
        EngineEvent::TranscodeCompleted {
            attempt,
            result: Err(err),
        } => Some(Msg::TranscodeFailed {
            attempt,
            reason: err.to_string(),
        }),
    }
}
