//! Store metadata management

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Store format version; bump when the on-disk layout changes.
/// A mismatch invalidates the whole store.
pub const CACHE_VERSION: &str = "1";

/// Metadata block at the head of store.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    /// Store format version
    pub cache_version: String,

    /// RFC 3339 timestamp of the last save
    pub generated_at: String,
}

impl StoreMeta {
    pub fn new() -> Self {
        Self {
            cache_version: CACHE_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }

    /// Whether this store was written with the current format version
    pub fn is_current(&self) -> bool {
        self.cache_version == CACHE_VERSION
    }
}

impl Default for StoreMeta {
    fn default() -> Self {
        Self::new()
    }
}
