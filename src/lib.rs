//! Stowage - Transactional object storage on an embedded database
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use stowage_store as store;
pub use stowage_store::{Persistable, Store, StoreConfig, StoreError, Validator};
