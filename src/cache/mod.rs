//! Cache module - persisted reference -> records mapping
//!
//! Provides:
//! - The durable cache store (store.json)
//! - Store metadata and versioning

pub mod meta;
pub mod store;
