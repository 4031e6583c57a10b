//! Stowage Store - Transactional facade over an embedded object store
//!
//! A [`Store`] is bound at construction to one of two redb-backed stores:
//! - a persistent database file
//! - an ephemeral in-memory database, labelled by an identifier
//!
//! ## Architecture
//!
//! - `selector` resolves a [`StoreConfig`] to a [`StorageHandle`] once
//! - `engine` holds the row primitives (insert/replace, delete, fetch)
//! - `facade` wraps every mutation in a single write transaction that commits
//!   or rolls back as a whole, after consulting the optional [`Validator`]
//!
//! Reads run against a snapshot and report absence as `None`, never as an error.
//! A store that failed to open reports `StoreError::StoreUnavailable` on every call.

mod config;
mod engine;
mod error;
mod facade;
mod handle;
mod persistable;
mod selector;
mod sort;
mod validator;

pub use config::{ConfigError, StoreConfig, DEFAULT_MEMORY_IDENTIFIER, DEFAULT_STORE_PATH};
pub use error::{EngineError, Result, StoreError, ValidationError};
pub use facade::{Store, WriteContext};
pub use handle::{HandleKind, StorageHandle};
pub use persistable::Persistable;
pub use selector::resolve;
pub use validator::{TypedValidator, Validator};
