use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use engine_logging::{engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::capability::{transcode_argv, ChannelListener, LoadConfig, TranscodeEngine};
use crate::fetch::{fetch_to_blob, Fetcher, ReqwestFetcher};
use crate::settings::{BINARY_MEDIA_TYPE, BINARY_RESOURCE, PROGRAM_MEDIA_TYPE, PROGRAM_RESOURCE};
use crate::{AttemptId, BlobRegistry, BlobUrl, EngineError, EngineEvent, EngineSettings};

enum EngineCommand {
    Bootstrap,
    Transcode {
        attempt: AttemptId,
        input_name: String,
        bytes: Bytes,
        output_name: String,
    },
}

/// Owns the engine worker thread.
///
/// Commands run one at a time on the worker's tokio runtime, so at most one
/// engine call is outstanding. Events (including progress and log lines
/// emitted while `exec` runs) come back through [`EngineHandle::try_recv`].
///
/// Dropping the handle (or calling [`EngineHandle::shutdown`]) aborts the
/// engine call in flight and waits until the worker has released the engine.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        settings: EngineSettings,
        engine: Arc<dyn TranscodeEngine>,
        blobs: BlobRegistry,
    ) -> Result<Self, EngineError> {
        let fetcher = Arc::new(ReqwestFetcher::new(settings.fetch.clone()));
        Self::with_fetcher(settings, engine, blobs, fetcher)
    }

    pub fn with_fetcher(
        settings: EngineSettings,
        engine: Arc<dyn TranscodeEngine>,
        blobs: BlobRegistry,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let cancel = CancellationToken::new();

        let mut worker = Worker {
            settings,
            engine,
            blobs,
            fetcher,
            event_tx,
            bootstrapped: false,
        };
        let stop = cancel.clone();
        let join = thread::Builder::new()
            .name("transcoder-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let aborted = runtime.block_on(async {
                        tokio::select! {
                            () = worker.handle(command) => false,
                            () = stop.cancelled() => true,
                        }
                    });
                    if aborted {
                        engine_warn!("Engine call aborted by shutdown");
                        break;
                    }
                }
                // The engine (and its sandbox) goes before the runtime.
                drop(worker);
                drop(runtime);
            })?;

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            event_rx,
            cancel,
            worker: Some(join),
        })
    }

    /// Stops the worker and blocks until it has exited.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.cancel.cancel();
        self.cmd_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                engine_warn!("Engine worker panicked");
            }
        }
    }

    pub fn bootstrap(&self) {
        self.send(EngineCommand::Bootstrap);
    }

    pub fn transcode(
        &self,
        attempt: AttemptId,
        input_name: impl Into<String>,
        bytes: Bytes,
        output_name: impl Into<String>,
    ) {
        self.send(EngineCommand::Transcode {
            attempt,
            input_name: input_name.into(),
            bytes,
            output_name: output_name.into(),
        });
    }

    fn send(&self, command: EngineCommand) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(command);
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    settings: EngineSettings,
    engine: Arc<dyn TranscodeEngine>,
    blobs: BlobRegistry,
    fetcher: Arc<dyn Fetcher>,
    event_tx: mpsc::Sender<EngineEvent>,
    bootstrapped: bool,
}

impl Worker {
    async fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Bootstrap => {
                if self.bootstrapped {
                    engine_warn!("Ignoring repeated bootstrap request");
                    return;
                }
                self.bootstrapped = true;
                let result = self.bootstrap().await;
                match &result {
                    Ok(()) => engine_info!("Engine bootstrap complete"),
                    Err(err) => engine_warn!("Engine bootstrap failed: {}", err),
                }
                let _ = self.event_tx.send(EngineEvent::Loaded(result));
            }
            EngineCommand::Transcode {
                attempt,
                input_name,
                bytes,
                output_name,
            } => {
                let result = self.transcode(&input_name, bytes, &output_name).await;
                if let Err(err) = &result {
                    engine_warn!("Transcode attempt {} failed: {}", attempt, err);
                }
                let _ = self
                    .event_tx
                    .send(EngineEvent::TranscodeCompleted { attempt, result });
            }
        }
    }

    async fn bootstrap(&self) -> Result<(), EngineError> {
        self.engine
            .subscribe(Arc::new(ChannelListener::new(self.event_tx.clone())));

        let distribution = &self.settings.distribution;
        let program_url = distribution.resource_url(PROGRAM_RESOURCE)?;
        let binary_url = distribution.resource_url(BINARY_RESOURCE)?;
        engine_info!(
            "Fetching engine {} from {}",
            distribution.version,
            distribution.base_url
        );

        let program = fetch_to_blob(
            self.fetcher.as_ref(),
            &self.blobs,
            program_url.as_str(),
            PROGRAM_MEDIA_TYPE,
            self.settings.program_sha256.as_deref(),
        )
        .await?;
        let binary = match fetch_to_blob(
            self.fetcher.as_ref(),
            &self.blobs,
            binary_url.as_str(),
            BINARY_MEDIA_TYPE,
            self.settings.binary_sha256.as_deref(),
        )
        .await
        {
            Ok(binary) => binary,
            Err(err) => {
                self.revoke(&[&program]);
                return Err(err);
            }
        };

        let config = LoadConfig {
            program: program.clone(),
            binary: binary.clone(),
        };
        if let Err(err) = self.engine.load(config).await {
            self.revoke(&[&program, &binary]);
            return Err(err);
        }
        Ok(())
    }

    fn revoke(&self, urls: &[&BlobUrl]) {
        for url in urls {
            self.blobs.revoke(url);
        }
    }

    async fn transcode(
        &self,
        input_name: &str,
        bytes: Bytes,
        output_name: &str,
    ) -> Result<Bytes, EngineError> {
        let result = self.run_attempt(input_name, bytes, output_name).await;
        for name in [input_name, output_name] {
            if let Err(err) = self.engine.delete_file(name).await {
                engine_warn!("Could not remove engine file {}: {}", name, err);
            }
        }
        result
    }

    async fn run_attempt(
        &self,
        input_name: &str,
        bytes: Bytes,
        output_name: &str,
    ) -> Result<Bytes, EngineError> {
        self.engine.write_file(input_name, bytes).await?;
        self.engine
            .exec(&transcode_argv(input_name, output_name))
            .await?;
        self.engine.read_file(output_name).await
    }
}
