use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use uuid::Uuid;

const BLOB_SCHEME_PREFIX: &str = "blob:transcoder/";

/// Revocable, locally addressable reference to an in-memory payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Bytes,
    pub media_type: Option<String>,
}

/// Process-wide table of blob references. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    entries: Arc<Mutex<HashMap<BlobUrl, Blob>>>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, bytes: Bytes, media_type: Option<String>) -> BlobUrl {
        let url = BlobUrl(format!("{BLOB_SCHEME_PREFIX}{}", Uuid::new_v4()));
        self.lock()
            .insert(url.clone(), Blob { bytes, media_type });
        url
    }

    pub fn resolve(&self, url: &BlobUrl) -> Option<Blob> {
        self.lock().get(url).cloned()
    }

    /// Returns `false` when the reference was unknown or already revoked.
    pub fn revoke(&self, url: &BlobUrl) -> bool {
        self.lock().remove(url).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<BlobUrl, Blob>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
