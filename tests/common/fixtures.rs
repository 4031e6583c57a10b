use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use stowage::{Persistable, Store, StoreConfig, Validator};
use tempfile::TempDir;

/// A saved contact, keyed by handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub handle: String,
    pub name: String,
    pub team: String,
    pub rank: u32,
}

impl Persistable for Contact {
    const TYPE_NAME: &'static str = "contact";
    type Key = String;

    fn primary_key(&self) -> String {
        self.handle.clone()
    }
}

/// A second type sharing the store, keyed by number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: u64,
    pub total_cents: i64,
}

impl Persistable for Invoice {
    const TYPE_NAME: &'static str = "invoice";
    type Key = u64;

    fn primary_key(&self) -> u64 {
        self.number
    }
}

/// A note whose tag is left out of the stored form when unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub body: String,
}

impl Persistable for Note {
    const TYPE_NAME: &'static str = "note";
    type Key = u64;

    fn primary_key(&self) -> u64 {
        self.id
    }
}

pub fn contact(handle: &str, team: &str, rank: u32) -> Contact {
    Contact {
        handle: handle.to_string(),
        name: handle.to_uppercase(),
        team: team.to_string(),
        rank,
    }
}

pub fn key(handle: &str) -> String {
    handle.to_string()
}

/// A config whose database path sits below a regular file, so it can never open
pub fn unopenable_config(dir: &Path) -> StoreConfig {
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, b"not a directory").expect("Failed to create blocker file");
    StoreConfig::persistent(blocker.join("store.redb"))
}

/// Run `test` once against an in-memory store and once against a fresh database file
pub fn with_each_store(test: impl Fn(Store)) {
    test(Store::new(StoreConfig::in_memory()));

    let dir = TempDir::new().expect("Failed to create temp dir");
    test(Store::new(StoreConfig::persistent(dir.path().join("store.redb"))));
}

/// Like [`with_each_store`], with `validator` attached to both stores
pub fn with_each_validated_store(validator: Arc<dyn Validator>, test: impl Fn(Store)) {
    test(Store::with_validator(StoreConfig::in_memory(), validator.clone()));

    let dir = TempDir::new().expect("Failed to create temp dir");
    test(Store::with_validator(
        StoreConfig::persistent(dir.path().join("store.redb")),
        validator,
    ));
}
