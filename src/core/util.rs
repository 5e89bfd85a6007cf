//! Common utilities

use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::core::paths::STORE_DIR;

/// Get file modification time in milliseconds since epoch
pub fn get_mtime_ms(path: &Path) -> std::io::Result<i64> {
    let metadata = std::fs::metadata(path)?;
    let mtime = metadata.modified()?;
    let duration = mtime
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    Ok(duration.as_millis() as i64)
}

/// Freshness timestamp for the artifact behind a normalized reference.
///
/// Files report their own mtime. Directories report the newest mtime in the
/// whole tree, so a change to any constituent file invalidates entries keyed
/// on the directory. References that name no filesystem artifact report None.
pub fn artifact_mtime_ms(reference: &str) -> Option<i64> {
    let path = Path::new(reference);
    if path.is_dir() {
        let mut newest = get_mtime_ms(path).ok()?;
        // The store directory itself must not count as a change, or caching
        // a directory that contains it would self-invalidate on every save.
        let walker = WalkDir::new(path)
            .into_iter()
            .filter_entry(|e| e.file_name() != STORE_DIR);
        for entry in walker.flatten() {
            if let Ok(mtime) = get_mtime_ms(entry.path()) {
                newest = newest.max(mtime);
            }
        }
        Some(newest)
    } else if path.is_file() {
        get_mtime_ms(path).ok()
    } else {
        None
    }
}
