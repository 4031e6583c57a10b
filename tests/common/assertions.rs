use stowage::store::EngineError;
use stowage::StoreError;

/// Assert that an operation failed because the store could not be opened
pub fn assert_unavailable<T: std::fmt::Debug>(result: Result<T, StoreError>) {
    match result {
        Err(StoreError::StoreUnavailable(_)) => {}
        other => panic!("Expected StoreUnavailable, got {:?}", other),
    }
}

/// Assert that the validator rejected the subject
pub fn assert_validation_failed<T: std::fmt::Debug>(result: Result<T, StoreError>) {
    match result {
        Err(StoreError::ValidationFailed(_)) => {}
        other => panic!("Expected ValidationFailed, got {:?}", other),
    }
}

/// Assert that the engine refused an insert over an existing key
pub fn assert_duplicate_key<T: std::fmt::Debug>(result: Result<T, StoreError>) {
    match result {
        Err(StoreError::PersistenceFailed(EngineError::DuplicateKey { .. })) => {}
        other => panic!("Expected a duplicate key failure, got {:?}", other),
    }
}
