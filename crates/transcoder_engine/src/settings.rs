use std::time::Duration;

use url::Url;

use crate::{EngineError, FailureKind};

pub const DEFAULT_DISTRIBUTION_BASE_URL: &str = "http://127.0.0.1:8765/engine";
pub const DEFAULT_ENGINE_VERSION: &str = "0.12.6";
pub const PROGRAM_RESOURCE: &str = "engine-core.js";
pub const PROGRAM_MEDIA_TYPE: &str = "text/javascript";
pub const BINARY_RESOURCE: &str = "engine-core.wasm";
pub const BINARY_MEDIA_TYPE: &str = "application/wasm";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            redirect_limit: 5,
            max_bytes: 256 * 1024 * 1024,
        }
    }
}

/// Where the engine resources are served from, pinned to one engine version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub base_url: String,
    pub version: String,
}

impl Distribution {
    /// `{base_url}/{version}/{file}`
    pub fn resource_url(&self, file: &str) -> Result<Url, EngineError> {
        let mut base = self.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base = Url::parse(&base)
            .map_err(|err| EngineError::new(FailureKind::InvalidUrl, err.to_string()))?;
        base.join(&format!("{}/{}", self.version, file))
            .map_err(|err| EngineError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DISTRIBUTION_BASE_URL.to_string(),
            version: DEFAULT_ENGINE_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub distribution: Distribution,
    pub fetch: FetchSettings,
    /// Expected lowercase hex SHA-256 of the program resource, if pinned.
    pub program_sha256: Option<String>,
    /// Expected lowercase hex SHA-256 of the binary resource, if pinned.
    pub binary_sha256: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_url_joins_version_and_file() {
        let dist = Distribution {
            base_url: "https://cdn.example.com/engine/".to_string(),
            version: "1.2.3".to_string(),
        };
        let url = dist.resource_url(BINARY_RESOURCE).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cdn.example.com/engine/1.2.3/engine-core.wasm"
        );

        let dist = Distribution {
            base_url: "https://cdn.example.com/engine".to_string(),
            ..dist
        };
        assert_eq!(
            dist.resource_url(PROGRAM_RESOURCE).unwrap().as_str(),
            "https://cdn.example.com/engine/1.2.3/engine-core.js"
        );
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let dist = Distribution {
            base_url: "not a url".to_string(),
            version: "1".to_string(),
        };
        let err = dist.resource_url(PROGRAM_RESOURCE).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
