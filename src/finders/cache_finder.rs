//! Cache finder - answers lookups from the persisted store
//!
//! Performs no discovery and no writes of its own; population happens through
//! CacheStore::save, by whichever finder actually resolved the reference.

use std::path::PathBuf;

use crate::cache::store::CacheStore;
use crate::core::model::TestInfo;
use crate::core::paths::normalize_reference;
use crate::finders::TestFinder;

pub struct CacheFinder {
    store: CacheStore,
    root: PathBuf,
}

impl CacheFinder {
    pub const NAME: &'static str = "CACHE";

    pub fn new(root: impl Into<PathBuf>, store: CacheStore) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    /// Look up previously resolved records for a raw reference.
    ///
    /// The reference is normalized exactly as at save time, so "src/foo/" and
    /// the absolute path of src/foo answer from the same entry.
    pub fn find_test_by_cache(&self, reference: &str) -> Option<Vec<TestInfo>> {
        let key = normalize_reference(&self.root, reference);
        self.store.load(&key)
    }
}

impl TestFinder for CacheFinder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn find(&self, reference: &str) -> Option<Vec<TestInfo>> {
        self.find_test_by_cache(reference)
    }
}
