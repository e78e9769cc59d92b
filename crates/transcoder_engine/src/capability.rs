use std::sync::{mpsc, Arc};

use bytes::Bytes;

use crate::{BlobUrl, EngineError, EngineEvent};

/// Blob references to the two engine resources handed to [`TranscodeEngine::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    pub program: BlobUrl,
    pub binary: BlobUrl,
}

/// Receives the engine's `progress` and `log` events.
pub trait EngineListener: Send + Sync {
    fn on_progress(&self, ratio: f64, elapsed_micros: i64);
    fn on_log(&self, message: &str);
}

/// Forwards engine events into the worker's event channel.
pub struct ChannelListener {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelListener {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EngineListener for ChannelListener {
    fn on_progress(&self, ratio: f64, elapsed_micros: i64) {
        let _ = self.tx.send(EngineEvent::Progress {
            ratio,
            elapsed_micros,
        });
    }

    fn on_log(&self, message: &str) {
        let _ = self.tx.send(EngineEvent::Log {
            message: message.to_string(),
        });
    }
}

/// The external transcoding capability: a sandboxed filesystem plus a command runner.
#[async_trait::async_trait]
pub trait TranscodeEngine: Send + Sync {
    fn subscribe(&self, listener: Arc<dyn EngineListener>);

    async fn load(&self, config: LoadConfig) -> Result<(), EngineError>;

    async fn write_file(&self, name: &str, bytes: Bytes) -> Result<(), EngineError>;

    async fn exec(&self, argv: &[String]) -> Result<(), EngineError>;

    async fn read_file(&self, name: &str) -> Result<Bytes, EngineError>;

    /// Removes a file from the engine filesystem; a missing file is not an error.
    async fn delete_file(&self, name: &str) -> Result<(), EngineError>;
}

/// The fixed command line: `-i <input> <output>`.
pub fn transcode_argv(input_name: &str, output_name: &str) -> Vec<String> {
    vec![
        "-i".to_string(),
        input_name.to_string(),
        output_name.to_string(),
    ]
}
