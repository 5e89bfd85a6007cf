//! Reference normalization and store location
//!
//! Keys in the store are normalized references; save-time and load-time must
//! run the same normalization or lookups silently miss.

use std::path::{Path, PathBuf};

/// Directory under the root that holds the store file
pub const STORE_DIR: &str = ".tcache";

/// Store file name
pub const STORE_FILE: &str = "store.json";

/// Directory holding the store file for a given root.
///
/// The TCACHE_DIR environment variable overrides the default location, e.g.
/// to share one store across checkouts.
pub fn store_dir(root: &Path) -> PathBuf {
    match std::env::var_os("TCACHE_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => root.join(STORE_DIR),
    }
}

/// Full path of the store file for a given root
pub fn store_path(root: &Path) -> PathBuf {
    store_dir(root).join(STORE_FILE)
}

/// Normalize a test reference into a store key.
///
/// References that name an existing filesystem artifact resolve to an
/// absolute path (relative paths are taken against root), with '/' as
/// separator. Non-path references such as module or class names keep the
/// caller's spelling. Trailing slashes are stripped either way, so "src/foo"
/// and "src/foo/" share one entry.
pub fn normalize_reference(root: &Path, reference: &str) -> String {
    let trimmed = reference.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }

    let path = Path::new(trimmed);
    let candidate = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    match candidate.canonicalize() {
        Ok(resolved) => resolved.to_string_lossy().replace('\\', "/"),
        Err(_) => trimmed.to_string(),
    }
}
