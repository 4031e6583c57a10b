//! Resolves a configuration to the handle that backs a facade

use crate::error::{Result, StoreError};
use crate::{StorageHandle, StoreConfig};
use std::time::Instant;
use tracing::{info, warn};

/// Open the store named by `config`.
///
/// Any engine failure while opening is reported as `StoreUnavailable`.
pub fn resolve(config: &StoreConfig) -> Result<StorageHandle> {
    let started_at = Instant::now();
    let mode = if config.in_memory { "memory" } else { "file" };

    let opened = if config.in_memory {
        StorageHandle::open_in_memory(&config.memory_identifier)
    } else {
        StorageHandle::open_persistent(&config.path)
    };

    match opened {
        Ok(handle) => {
            info!(
                mode,
                duration_ms = started_at.elapsed().as_millis() as u64,
                "opened {}",
                handle.kind()
            );
            Ok(handle)
        }
        Err(err) => {
            let target = if config.in_memory {
                format!("in-memory store '{}'", config.memory_identifier)
            } else {
                format!("persistent store at {}", config.path.display())
            };
            warn!(
                mode,
                duration_ms = started_at.elapsed().as_millis() as u64,
                error = %err,
                "failed to open {}",
                target
            );
            Err(StoreError::StoreUnavailable(format!("{}: {}", target, err)))
        }
    }
}
