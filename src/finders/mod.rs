//! Finder pipeline seam
//!
//! A finder turns a raw test reference into resolved TestInfo records. The
//! orchestrator tries finders in order and takes the first answer; the cache
//! finder sits in front of the discovery-based ones so a repeated reference
//! never pays for discovery twice.

pub mod cache_finder;

pub use cache_finder::CacheFinder;

use crate::core::model::TestInfo;

/// A pluggable test-finding strategy.
pub trait TestFinder {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Resolve a raw reference into records, or report a clean miss
    fn find(&self, reference: &str) -> Option<Vec<TestInfo>>;
}
