use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::engine_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transcoder_engine::{
    Distribution, EngineSettings, FetchSettings, DEFAULT_DISTRIBUTION_BASE_URL,
    DEFAULT_ENGINE_VERSION,
};

use super::logging::{LogDestination, LogLevel};

const DEFAULT_CONFIG_FILE: &str = "transcoder.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub distribution_base_url: String,
    pub engine_version: String,
    pub program_sha256: Option<String>,
    pub binary_sha256: Option<String>,
    pub output_dir: PathBuf,
    pub log_destination: LogDestination,
    pub log_level: LogLevel,
    pub fetch_timeout_secs: u64,
    pub max_resource_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            distribution_base_url: DEFAULT_DISTRIBUTION_BASE_URL.to_string(),
            engine_version: DEFAULT_ENGINE_VERSION.to_string(),
            program_sha256: None,
            binary_sha256: None,
            output_dir: PathBuf::from("output"),
            log_destination: LogDestination::default(),
            log_level: LogLevel::default(),
            fetch_timeout_secs: fetch.request_timeout.as_secs(),
            max_resource_bytes: fetch.max_bytes,
        }
    }
}

impl AppConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            distribution: Distribution {
                base_url: self.distribution_base_url.clone(),
                version: self.engine_version.clone(),
            },
            fetch: FetchSettings {
                request_timeout: Duration::from_secs(self.fetch_timeout_secs),
                max_bytes: self.max_resource_bytes,
                ..FetchSettings::default()
            },
            program_sha256: self.program_sha256.clone(),
            binary_sha256: self.binary_sha256.clone(),
        }
    }
}

/// Loads the config file.
///
/// An explicit path must exist. Without one, `./transcoder.ron` is used when
/// present and defaults otherwise.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !path.exists() {
                return Ok(AppConfig::default());
            }
            path
        }
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    engine_info!("Loaded config from {:?}", path);
    Ok(config)
}
