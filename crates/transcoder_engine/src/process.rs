use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use engine_logging::{engine_debug, engine_info};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::capability::{EngineListener, LoadConfig, TranscodeEngine};
use crate::progress::ProgressParser;
use crate::{BlobRegistry, BlobUrl, EngineError, FailureKind};

const PROGRAM_FILE: &str = "engine-core";
const BINARY_FILE: &str = "engine-core.wasm";
const PLUMBING_ARGS: [&str; 5] = ["-hide_banner", "-nostdin", "-y", "-progress", "pipe:1"];

/// Engine backed by an ffmpeg-compatible executable.
///
/// `load` installs the program resource as the executable and the binary
/// resource next to it inside a private sandbox directory, which doubles as
/// the engine's filesystem for `write_file`/`read_file`.
pub struct ProcessEngine {
    blobs: BlobRegistry,
    sandbox: TempDir,
    listeners: Mutex<Vec<Arc<dyn EngineListener>>>,
    program: Mutex<Option<PathBuf>>,
}

impl ProcessEngine {
    pub fn new(blobs: BlobRegistry) -> Result<Self, EngineError> {
        let sandbox = tempfile::Builder::new()
            .prefix("transcoder-engine-")
            .tempdir()?;
        Ok(Self {
            blobs,
            sandbox,
            listeners: Mutex::new(Vec::new()),
            program: Mutex::new(None),
        })
    }

    pub fn sandbox_dir(&self) -> &Path {
        self.sandbox.path()
    }

    fn listeners(&self) -> Vec<Arc<dyn EngineListener>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn emit_log(&self, message: &str) {
        for listener in self.listeners() {
            listener.on_log(message);
        }
    }

    fn emit_progress(&self, ratio: f64, elapsed_micros: i64) {
        for listener in self.listeners() {
            listener.on_progress(ratio, elapsed_micros);
        }
    }

    fn loaded_program(&self) -> Result<PathBuf, EngineError> {
        self.program
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| EngineError::new(FailureKind::NotLoaded, "load has not completed"))
    }

    fn resolve_resource(&self, url: &BlobUrl) -> Result<Bytes, EngineError> {
        let blob = self
            .blobs
            .resolve(url)
            .ok_or_else(|| EngineError::new(FailureKind::UnknownBlob, url.to_string()))?;
        if blob.bytes.is_empty() {
            return Err(EngineError::new(
                FailureKind::Incompatible,
                format!("resource {url} is empty"),
            ));
        }
        Ok(blob.bytes)
    }

    /// Maps an engine-visible file name to a path inside the sandbox.
    fn sandbox_path(&self, name: &str) -> Result<PathBuf, EngineError> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0'])
            || name == PROGRAM_FILE
            || name == BINARY_FILE;
        if invalid {
            return Err(EngineError::new(FailureKind::InvalidFileName, name));
        }
        Ok(self.sandbox.path().join(name))
    }

    async fn handshake(&self, program: &Path) -> Result<(), EngineError> {
        let output = Command::new(program)
            .arg("-version")
            .current_dir(self.sandbox.path())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| EngineError::new(FailureKind::Incompatible, err.to_string()))?;
        if !output.status.success() {
            return Err(EngineError::new(
                FailureKind::Incompatible,
                format!("version handshake exited with {}", output.status),
            ));
        }
        let banner = String::from_utf8_lossy(&output.stdout);
        if let Some(first) = banner.lines().next() {
            self.emit_log(first);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TranscodeEngine for ProcessEngine {
    fn subscribe(&self, listener: Arc<dyn EngineListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    async fn load(&self, config: LoadConfig) -> Result<(), EngineError> {
        let program_bytes = self.resolve_resource(&config.program)?;
        let binary_bytes = self.resolve_resource(&config.binary)?;

        let program = self.sandbox.path().join(PROGRAM_FILE);
        tokio::fs::write(&program, &program_bytes).await?;
        tokio::fs::write(self.sandbox.path().join(BINARY_FILE), &binary_bytes).await?;
        mark_executable(&program).await?;

        self.handshake(&program).await?;
        engine_info!("Engine loaded into {:?}", self.sandbox.path());
        *self.program.lock().unwrap_or_else(PoisonError::into_inner) = Some(program);
        Ok(())
    }

    async fn write_file(&self, name: &str, bytes: Bytes) -> Result<(), EngineError> {
        self.loaded_program()?;
        let path = self.sandbox_path(name)?;
        tokio::fs::write(&path, &bytes).await?;
        engine_debug!("Wrote {} bytes to engine file {}", bytes.len(), name);
        Ok(())
    }

    async fn exec(&self, argv: &[String]) -> Result<(), EngineError> {
        let program = self.loaded_program()?;
        let mut child = Command::new(&program)
            .args(PLUMBING_ARGS)
            .args(argv)
            .current_dir(self.sandbox.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| EngineError::new(FailureKind::ExecFailed { code: None }, err.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::new(FailureKind::Io, "engine stdout unavailable"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::new(FailureKind::Io, "engine stderr unavailable"))?;
        let mut progress_lines = BufReader::new(stdout).lines();
        let mut diag_lines = BufReader::new(stderr).lines();

        let mut parser = ProgressParser::new();
        let mut progress_open = true;
        let mut diag_open = true;
        while progress_open || diag_open {
            tokio::select! {
                line = progress_lines.next_line(), if progress_open => match line? {
                    Some(line) => {
                        if let Some(tick) = parser.observe_progress(&line) {
                            self.emit_progress(tick.ratio, tick.elapsed_micros);
                        }
                    }
                    None => progress_open = false,
                },
                line = diag_lines.next_line(), if diag_open => match line? {
                    Some(line) => {
                        parser.observe_diagnostic(&line);
                        if !line.trim().is_empty() {
                            self.emit_log(line.trim_end());
                        }
                    }
                    None => diag_open = false,
                },
            }
        }

        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(EngineError::new(
                FailureKind::ExecFailed {
                    code: status.code(),
                },
                format!("argv {argv:?}"),
            ))
        }
    }

    async fn read_file(&self, name: &str) -> Result<Bytes, EngineError> {
        self.loaded_program()?;
        let path = self.sandbox_path(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(EngineError::new(
                FailureKind::MissingFile {
                    name: name.to_string(),
                },
                err.to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_file(&self, name: &str) -> Result<(), EngineError> {
        let path = self.sandbox_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                engine_debug!("Removed engine file {}", name);
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> Result<(), EngineError> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = tokio::fs::metadata(path).await?.permissions();
    permissions.set_mode(0o755);
    tokio::fs::set_permissions(path, permissions).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> Result<(), EngineError> {
    Ok(())
}
