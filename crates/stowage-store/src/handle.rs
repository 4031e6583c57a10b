//! Handles onto one of the two backing stores

use crate::engine::SEQUENCE_TABLE;
use crate::error::EngineError;
use redb::backends::InMemoryBackend;
use redb::{Database, ReadTransaction, WriteTransaction};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which store a handle is connected to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleKind {
    Persistent { path: PathBuf },
    InMemory { identifier: String },
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Persistent { path } => write!(f, "persistent store at {}", path.display()),
            HandleKind::InMemory { identifier } => write!(f, "in-memory store '{}'", identifier),
        }
    }
}

/// An open session on exactly one backing store.
///
/// Owned by a single facade; the database is closed when the handle drops.
pub struct StorageHandle {
    db: Database,
    kind: HandleKind,
}

impl StorageHandle {
    /// Create or open the database file at `path`
    pub fn open_persistent(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(&path)?;
        Self::initialize(db, HandleKind::Persistent { path })
    }

    /// Open a fresh ephemeral store labelled `identifier`
    pub fn open_in_memory(identifier: &str) -> Result<Self, EngineError> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::initialize(
            db,
            HandleKind::InMemory {
                identifier: identifier.to_string(),
            },
        )
    }

    fn initialize(db: Database, kind: HandleKind) -> Result<Self, EngineError> {
        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db, kind })
    }

    pub fn kind(&self) -> &HandleKind {
        &self.kind
    }

    pub fn is_in_memory(&self) -> bool {
        matches!(self.kind, HandleKind::InMemory { .. })
    }

    pub(crate) fn begin_write(&self) -> Result<WriteTransaction, EngineError> {
        Ok(self.db.begin_write()?)
    }

    pub(crate) fn begin_read(&self) -> Result<ReadTransaction, EngineError> {
        Ok(self.db.begin_read()?)
    }
}

impl fmt::Debug for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageHandle")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
