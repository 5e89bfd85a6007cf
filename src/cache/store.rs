//! Cache store - durable reference -> records mapping
//!
//! The store is a single JSON file replaced atomically on every save. Each
//! operation opens, reads, and closes the file; nothing is held in memory
//! across calls, so separate invocations and separate processes always
//! observe a complete version of the store.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cache::meta::StoreMeta;
use crate::core::model::TestInfo;
use crate::core::util::artifact_mtime_ms;

/// Why a store read produced nothing usable
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("store corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Condition of the store file, for diagnostics
#[derive(Debug)]
pub enum StoreStatus {
    Missing,
    Unreadable,
    Corrupt,
    Ready { meta: StoreMeta, entry_count: usize },
}

/// One persisted resolution of a reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Normalized reference this entry was saved under
    pub reference: String,

    /// Resolved records; empty means "resolved to nothing", which is still a hit
    pub records: Vec<TestInfo>,

    /// Artifact mtime at save time; None when the reference names no
    /// filesystem artifact
    pub source_mtime_ms: Option<i64>,
}

/// Entry summary for diagnostics
#[derive(Debug)]
pub struct EntrySummary {
    pub reference: String,
    pub record_count: usize,
    pub stale: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    meta: StoreMeta,
    entries: BTreeMap<String, CacheEntry>,
}

/// Handle to the persisted store.
///
/// Construction is cheap and does not touch the filesystem; all I/O happens
/// per operation. Callers pass normalized, non-empty references (see
/// core::paths::normalize_reference).
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a normalized reference.
    ///
    /// Missing file, unreadable or unparseable content, unknown key, version
    /// mismatch, and a stale artifact all answer None; nothing here ever
    /// errors, because a broken cache must not block discovery. Stale entries
    /// are ignored, not deleted.
    pub fn load(&self, reference: &str) -> Option<Vec<TestInfo>> {
        let store = self.read_store().ok()?;
        if !store.meta.is_current() {
            return None;
        }
        let entry = store.entries.get(reference)?;
        if entry.source_mtime_ms != artifact_mtime_ms(reference) {
            return None;
        }
        Some(entry.records.clone())
    }

    /// Persist a resolution under a normalized reference.
    ///
    /// Merges the entry into the full store and replaces the file atomically
    /// (write to a temp path, then rename), so a concurrent reader observes
    /// either the pre-save or post-save store, never a partial write. A
    /// corrupt or version-mismatched store is replaced wholesale.
    pub fn save(&self, reference: &str, records: Vec<TestInfo>) -> Result<()> {
        // Create the store directory before sampling the artifact mtime:
        // creating it afterwards would bump the parent directory's mtime and
        // immediately stale an entry keyed on that directory.
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory: {:?}", parent))?;
        }
        let mut store = self.read_store().unwrap_or_default();
        if !store.meta.is_current() {
            store = StoreFile::default();
        }
        store.meta = StoreMeta::new();
        store.entries.insert(
            reference.to_string(),
            CacheEntry {
                reference: reference.to_string(),
                records,
                source_mtime_ms: artifact_mtime_ms(reference),
            },
        );
        self.write_store(&store)
    }

    /// Remove the store entirely, forcing full re-discovery.
    /// A store that does not exist is already clear.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove store file: {:?}", self.path)),
        }
    }

    /// Condition of the store file
    pub fn status(&self) -> StoreStatus {
        match self.read_store() {
            Ok(store) => StoreStatus::Ready {
                entry_count: store.entries.len(),
                meta: store.meta,
            },
            Err(StoreError::Unavailable(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                StoreStatus::Missing
            }
            Err(StoreError::Unavailable(_)) => StoreStatus::Unreadable,
            Err(StoreError::Corrupt(_)) => StoreStatus::Corrupt,
        }
    }

    /// Per-entry summaries for diagnostics; empty when the store is unusable
    pub fn entries(&self) -> Vec<EntrySummary> {
        let store = match self.read_store() {
            Ok(store) if store.meta.is_current() => store,
            _ => return Vec::new(),
        };
        store
            .entries
            .values()
            .map(|entry| EntrySummary {
                reference: entry.reference.clone(),
                record_count: entry.records.len(),
                stale: entry.source_mtime_ms != artifact_mtime_ms(&entry.reference),
            })
            .collect()
    }

    fn read_store(&self) -> Result<StoreFile, StoreError> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_store(&self, store: &StoreFile) -> Result<()> {
        let json = serde_json::to_string_pretty(store)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write store file: {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace store file: {:?}", self.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::{tempdir, TempDir};

    fn store_in(temp: &TempDir) -> CacheStore {
        CacheStore::new(temp.path().join(".tcache").join("store.json"))
    }

    fn artifact(temp: &TempDir, name: &str) -> String {
        let file = temp.path().join(name);
        std::fs::write(&file, "content").unwrap();
        file.to_string_lossy().to_string()
    }

    fn touch_future(reference: &str, secs: u64) {
        let handle = std::fs::File::options().write(true).open(reference).unwrap();
        handle
            .set_modified(SystemTime::now() + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_load_missing_store_is_none() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        assert_eq!(store.load("NeverSeen.java"), None);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = artifact(&temp, "Foo.java");

        let records = vec![TestInfo::new("FooTest", "foo").with_build_targets(["foo"])];
        store.save(&reference, records.clone()).unwrap();

        assert_eq!(store.load(&reference), Some(records));
    }

    #[test]
    fn test_unknown_key_in_populated_store_is_none() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = artifact(&temp, "Foo.java");
        store
            .save(&reference, vec![TestInfo::new("FooTest", "foo")])
            .unwrap();

        assert_eq!(store.load("NeverSeen.java"), None);
    }

    #[test]
    fn test_empty_records_are_a_hit() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = artifact(&temp, "Bar.java");

        store.save(&reference, vec![]).unwrap();

        // "resolved to nothing" is distinct from "never looked up"
        assert_eq!(store.load(&reference), Some(vec![]));
    }

    #[test]
    fn test_modified_artifact_invalidates_entry() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = artifact(&temp, "Foo.java");

        store
            .save(&reference, vec![TestInfo::new("FooTest", "foo")])
            .unwrap();
        touch_future(&reference, 10);

        assert_eq!(store.load(&reference), None);
    }

    #[test]
    fn test_stale_entry_is_ignored_not_deleted() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = artifact(&temp, "Foo.java");

        store
            .save(&reference, vec![TestInfo::new("FooTest", "foo")])
            .unwrap();
        touch_future(&reference, 10);

        assert_eq!(store.load(&reference), None);
        let summaries = store.entries();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].stale);
    }

    #[test]
    fn test_deleted_artifact_invalidates_entry() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = artifact(&temp, "Foo.java");

        store
            .save(&reference, vec![TestInfo::new("FooTest", "foo")])
            .unwrap();
        std::fs::remove_file(&reference).unwrap();

        assert_eq!(store.load(&reference), None);
    }

    #[test]
    fn test_reference_without_artifact_stays_fresh() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);

        let records = vec![TestInfo::new("CtsFooTestCases", "cts-foo")];
        store.save("CtsFooTestCases", records.clone()).unwrap();

        assert_eq!(store.load("CtsFooTestCases"), Some(records));
    }

    #[test]
    fn test_artifact_appearing_after_save_invalidates() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = temp.path().join("Ghost.java").to_string_lossy().to_string();

        store
            .save(&reference, vec![TestInfo::new("GhostTest", "ghost")])
            .unwrap();
        std::fs::write(&reference, "class Ghost {}").unwrap();

        assert_eq!(store.load(&reference), None);
    }

    #[test]
    fn test_save_is_idempotent() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = artifact(&temp, "Foo.java");

        let records = vec![TestInfo::new("FooTest", "foo")];
        store.save(&reference, records.clone()).unwrap();
        store.save(&reference, records.clone()).unwrap();

        assert_eq!(store.load(&reference), Some(records));
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn test_saves_to_distinct_references_coexist() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let foo = artifact(&temp, "Foo.java");
        let bar = artifact(&temp, "Bar.java");

        store.save(&foo, vec![TestInfo::new("FooTest", "foo")]).unwrap();
        store.save(&bar, vec![TestInfo::new("BarTest", "bar")]).unwrap();

        assert_eq!(store.load(&foo).unwrap()[0].test_name, "FooTest");
        assert_eq!(store.load(&bar).unwrap()[0].test_name, "BarTest");
    }

    #[test]
    fn test_save_replaces_previous_records() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = artifact(&temp, "Foo.java");

        store
            .save(&reference, vec![TestInfo::new("OldTest", "foo")])
            .unwrap();
        store
            .save(&reference, vec![TestInfo::new("NewTest", "foo")])
            .unwrap();

        let records = store.load(&reference).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].test_name, "NewTest");
    }

    #[test]
    fn test_corrupt_store_is_a_miss_for_every_key() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load("anything"), None);
        assert!(matches!(store.status(), StoreStatus::Corrupt));
    }

    #[test]
    fn test_save_replaces_corrupt_store() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "garbage").unwrap();

        let reference = artifact(&temp, "Foo.java");
        let records = vec![TestInfo::new("FooTest", "foo")];
        store.save(&reference, records.clone()).unwrap();

        assert_eq!(store.load(&reference), Some(records));
    }

    #[test]
    fn test_version_mismatch_invalidates_whole_store() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = artifact(&temp, "Foo.java");
        store
            .save(&reference, vec![TestInfo::new("FooTest", "foo")])
            .unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        let rewritten = content.replace(
            &format!("\"cache_version\": \"{}\"", crate::cache::meta::CACHE_VERSION),
            "\"cache_version\": \"0\"",
        );
        assert_ne!(content, rewritten);
        std::fs::write(store.path(), rewritten).unwrap();

        assert_eq!(store.load(&reference), None);
    }

    #[test]
    fn test_clear_removes_store() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let reference = artifact(&temp, "Foo.java");
        store
            .save(&reference, vec![TestInfo::new("FooTest", "foo")])
            .unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.load(&reference), None);
    }

    #[test]
    fn test_clear_on_missing_store_is_ok() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_status_missing() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        assert!(matches!(store.status(), StoreStatus::Missing));
    }

    #[test]
    fn test_status_ready_counts_entries() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        store.save("a", vec![]).unwrap();
        store.save("b", vec![]).unwrap();

        match store.status() {
            StoreStatus::Ready { entry_count, meta } => {
                assert_eq!(entry_count, 2);
                assert!(meta.is_current());
            }
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        store.save("a", vec![]).unwrap();

        assert!(!store.path().with_extension("json.tmp").exists());
    }
}
