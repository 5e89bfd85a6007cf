//! Test Info Model
//!
//! Every finder, cache-backed or not, must resolve a test reference into the
//! same TestInfo shape before the orchestrator sees it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A resolved, runnable test descriptor.
///
/// TestInfo is immutable once built: finders replace records instead of
/// editing them in place. Sets are BTreeSets so serialized output is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestInfo {
    /// Test identifier, e.g. "FooTest".
    pub test_name: String,

    /// Build module that produces the test artifact.
    pub module_name: String,

    /// Locations where the test artifact is deployed.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub install_locations: BTreeSet<String>,

    /// Build targets required before the test can run.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub build_targets: BTreeSet<String>,

    /// Finder-specific auxiliary data payload.
    /// Allows direct embedding of structured data without JSON-in-string escaping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TestInfo {
    /// Create a new test info record
    pub fn new(test_name: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            module_name: module_name.into(),
            install_locations: BTreeSet::new(),
            build_targets: BTreeSet::new(),
            data: None,
        }
    }

    /// Set install locations
    pub fn with_install_locations(
        mut self,
        locations: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.install_locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// Set build targets
    pub fn with_build_targets(
        mut self,
        targets: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.build_targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Set finder-specific data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}
