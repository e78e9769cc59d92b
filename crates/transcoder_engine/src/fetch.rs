use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use sha2::{Digest, Sha256};

use crate::{BlobRegistry, BlobUrl, EngineError, FailureKind, FetchSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Bytes,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, EngineError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, redirect_counter: Arc<AtomicUsize>) -> Result<reqwest::Client, EngineError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| EngineError::new(FailureKind::Network, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> EngineError {
        EngineError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "resource too large",
        )
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, EngineError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| EngineError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(redirect_counter.clone())?;

        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchOutput {
            bytes: bytes.freeze(),
            final_url,
            redirect_count: redirect_counter.load(Ordering::Relaxed),
            content_type,
        })
    }
}

/// Downloads `url` and registers the payload as a local blob reference.
///
/// When `expected_sha256` is set the payload must match it before it is registered.
pub async fn fetch_to_blob(
    fetcher: &dyn Fetcher,
    blobs: &BlobRegistry,
    url: &str,
    media_type: &str,
    expected_sha256: Option<&str>,
) -> Result<BlobUrl, EngineError> {
    let output = fetcher.fetch(url).await?;
    if let Some(expected) = expected_sha256 {
        let actual = sha256_hex(&output.bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(EngineError::new(
                FailureKind::DigestMismatch {
                    resource: url.to_string(),
                },
                format!("expected {expected}, got {actual}"),
            ));
        }
    }
    Ok(blobs.create(output.bytes, Some(media_type.to_string())))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

fn map_reqwest_error(err: reqwest::Error) -> EngineError {
    if err.is_timeout() {
        return EngineError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return EngineError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    EngineError::new(FailureKind::Network, err.to_string())
}
