//! Transactional facade over the selected store
//!
//! Every mutation runs inside one redb write transaction that either commits
//! as a whole or is aborted before the call returns. Reads run against a read
//! snapshot and never open a write transaction.

use crate::engine::{self, Row};
use crate::error::{EngineError, Result, StoreError, ValidationError};
use crate::{selector, sort, Persistable, StorageHandle, StoreConfig, Validator};
use redb::WriteTransaction;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Consult `validator` about `value`; a `false` answer and a raised error both reject.
fn check(validator: Option<&dyn Validator>, type_name: &str, value: &dyn Any) -> Result<()> {
    let Some(validator) = validator else {
        return Ok(());
    };

    match validator.is_validated(value) {
        Ok(true) => Ok(()),
        Ok(false) => Err(StoreError::ValidationFailed(format!(
            "{} rejected by validator",
            type_name
        ))),
        Err(err) => Err(err.into()),
    }
}

fn abort(txn: WriteTransaction) {
    match txn.abort() {
        Ok(()) => warn!("write transaction rolled back"),
        Err(err) => warn!(error = %err, "write transaction rollback reported an error"),
    }
}

/// Key/typed-object store with one backing handle and an optional validator.
///
/// The handle is resolved once at construction. If it could not be opened the
/// facade stays constructible, but every operation fails with
/// `StoreError::StoreUnavailable`.
pub struct Store {
    handle: std::result::Result<StorageHandle, String>,
    validator: Option<Arc<dyn Validator>>,
    config: StoreConfig,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        let handle = selector::resolve(&config).map_err(|err| match err {
            StoreError::StoreUnavailable(reason) => reason,
            other => other.to_string(),
        });

        Self {
            handle,
            validator: None,
            config,
        }
    }

    /// Construct a facade whose writes are gated by `validator`
    pub fn with_validator(config: StoreConfig, validator: Arc<dyn Validator>) -> Self {
        let mut store = Self::new(config);
        store.validator = Some(validator);
        store
    }

    /// Like [`Store::new`], but report an unopenable store immediately
    pub fn try_new(config: StoreConfig) -> Result<Self> {
        let store = Self::new(config);
        store.handle()?;
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn is_in_memory(&self) -> bool {
        self.config.in_memory
    }

    pub fn is_available(&self) -> bool {
        self.handle.is_ok()
    }

    /// Human-readable description of the backing store
    pub fn describe(&self) -> String {
        match &self.handle {
            Ok(handle) => handle.kind().to_string(),
            Err(reason) => format!("unavailable ({})", reason),
        }
    }

    fn handle(&self) -> Result<&StorageHandle> {
        self.handle
            .as_ref()
            .map_err(|reason| StoreError::StoreUnavailable(reason.clone()))
    }

    fn validate<T: Persistable>(&self, object: &T) -> Result<()> {
        check(self.validator.as_deref(), T::TYPE_NAME, object)
    }

    /// Run `apply` in a write transaction, committing on success and aborting otherwise.
    fn transact<R, E, F>(&self, apply: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&WriteTransaction) -> std::result::Result<R, E>,
        E: From<StoreError>,
    {
        let handle = self.handle()?;
        let txn = handle.begin_write().map_err(StoreError::from)?;

        match apply(&txn) {
            Ok(value) => {
                // A failed commit leaves nothing behind; redb aborts it on drop.
                txn.commit()
                    .map_err(|err| StoreError::from(EngineError::from(err)))?;
                Ok(value)
            }
            Err(err) => {
                abort(txn);
                Err(err)
            }
        }
    }

    // ========== Write path ==========

    /// Persist `object`.
    ///
    /// With `update` set an existing row with the same key is replaced in
    /// place; otherwise an existing key fails with
    /// `EngineError::DuplicateKey` and nothing is written.
    #[tracing::instrument(skip_all, fields(type_name = T::TYPE_NAME, update = update))]
    pub fn save<T: Persistable>(&mut self, object: &T, update: bool) -> Result<()> {
        self.handle()?;
        self.validate(object)?;

        self.transact(|txn| -> Result<()> {
            engine::insert_or_replace(txn, object, update)?;
            Ok(())
        })?;
        debug!("saved 1 row");
        Ok(())
    }

    /// Persist every object in one transaction. Either all rows land or none do.
    #[tracing::instrument(skip_all, fields(type_name = T::TYPE_NAME, update = update, count = objects.len()))]
    pub fn save_all<T: Persistable>(&mut self, objects: &[T], update: bool) -> Result<()> {
        self.handle()?;
        for object in objects {
            self.validate(object)?;
        }
        if objects.is_empty() {
            return Ok(());
        }

        self.transact(|txn| -> Result<()> {
            for object in objects {
                engine::insert_or_replace(txn, object, update)?;
            }
            Ok(())
        })?;
        debug!("saved {} rows", objects.len());
        Ok(())
    }

    /// Run an arbitrary batch of mutations atomically.
    ///
    /// If `mutator` returns an error the transaction is rolled back and the
    /// error is returned unchanged. Objects written through the context are
    /// checked against the attached validator.
    #[tracing::instrument(skip_all)]
    pub fn update<R, E, F>(&mut self, mutator: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut WriteContext<'_>) -> std::result::Result<R, E>,
        E: From<StoreError>,
    {
        let validator = self.validator.as_deref();
        self.transact(|txn| {
            let mut context = WriteContext { txn, validator };
            mutator(&mut context)
        })
    }

    /// Remove the row for `object`. Returns whether a row existed.
    #[tracing::instrument(skip_all, fields(type_name = T::TYPE_NAME))]
    pub fn delete<T: Persistable>(&mut self, object: &T) -> Result<bool> {
        self.handle()?;
        self.validate(object)?;
        let key_bytes = engine::encode_key::<T>(&object.primary_key())?;

        let removed = self.transact(|txn| -> Result<bool> {
            Ok(engine::delete_row::<T>(txn, &key_bytes)?)
        })?;
        debug!(removed, "delete finished");
        Ok(removed)
    }

    /// Remove every object's row in one transaction. Returns how many rows existed.
    #[tracing::instrument(skip_all, fields(type_name = T::TYPE_NAME, count = objects.len()))]
    pub fn delete_all<T: Persistable>(&mut self, objects: &[T]) -> Result<usize> {
        self.handle()?;
        let mut keys = Vec::with_capacity(objects.len());
        for object in objects {
            self.validate(object)?;
            keys.push(engine::encode_key::<T>(&object.primary_key())?);
        }
        if keys.is_empty() {
            return Ok(0);
        }

        let removed = self.transact(|txn| -> Result<usize> {
            let mut removed = 0;
            for key_bytes in &keys {
                if engine::delete_row::<T>(txn, key_bytes)? {
                    removed += 1;
                }
            }
            Ok(removed)
        })?;
        debug!(removed, "delete batch finished");
        Ok(removed)
    }

    // ========== Read path ==========

    /// Fetch the row of type `T` stored under `key`
    pub fn object<T: Persistable>(&self, key: &T::Key) -> Result<Option<T>> {
        let handle = self.handle()?;
        let key_bytes = engine::encode_key::<T>(key)?;
        let txn = handle.begin_read()?;
        Ok(engine::fetch_by_key(&txn, &key_bytes)?)
    }

    /// Every row of type `T`, in primary-key order
    pub fn objects<T: Persistable>(&self) -> Result<Vec<T>> {
        Ok(self.rows::<T>()?.into_iter().map(|row| row.value).collect())
    }

    /// Every row of type `T` ordered by the field at `key_path`.
    ///
    /// Rows with equal sort values keep their insertion order, in both
    /// directions. Nulls sort before every other value, and a path that does
    /// not exist on a row counts as null. A path ending on an array or map
    /// fails with `InvalidSortKey` once a row carrying it is read.
    #[tracing::instrument(skip(self), fields(type_name = T::TYPE_NAME))]
    pub fn objects_sorted<T: Persistable>(&self, key_path: &str, ascending: bool) -> Result<Vec<T>> {
        let mut keyed = Vec::new();
        for row in self.rows_in_insertion_order::<T>()? {
            keyed.push((sort::sort_value(&row.value, key_path)?, row.value));
        }

        keyed.sort_by(|(a, _), (b, _)| {
            let ordering = sort::compare(a, b);
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        Ok(keyed.into_iter().map(|(_, value)| value).collect())
    }

    /// Every row of type `T` ordered by a key computed from each row.
    ///
    /// Ties keep insertion order, as with [`Store::objects_sorted`].
    pub fn objects_sorted_by_key<T, K, F>(&self, mut key: F, ascending: bool) -> Result<Vec<T>>
    where
        T: Persistable,
        K: Ord,
        F: FnMut(&T) -> K,
    {
        let mut values: Vec<T> = self
            .rows_in_insertion_order::<T>()?
            .into_iter()
            .map(|row| row.value)
            .collect();

        if ascending {
            values.sort_by_key(|value| key(value));
        } else {
            values.sort_by(|a, b| key(b).cmp(&key(a)));
        }
        Ok(values)
    }

    fn rows<T: Persistable>(&self) -> Result<Vec<Row<T>>> {
        let handle = self.handle()?;
        let txn = handle.begin_read()?;
        Ok(engine::fetch_all(&txn)?)
    }

    fn rows_in_insertion_order<T: Persistable>(&self) -> Result<Vec<Row<T>>> {
        let mut rows = self.rows::<T>()?;
        rows.sort_by_key(|row| row.seq);
        Ok(rows)
    }
}

/// The facade answers for its attached validator, and refuses everything when
/// none is attached.
impl Validator for Store {
    fn is_validated(&self, value: &dyn Any) -> std::result::Result<bool, ValidationError> {
        match &self.validator {
            Some(validator) => validator.is_validated(value),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("store", &self.describe())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Write scope handed to [`Store::update`] mutators.
///
/// All operations act on the same open transaction; `get` sees writes made
/// earlier in the scope.
pub struct WriteContext<'t> {
    txn: &'t WriteTransaction,
    validator: Option<&'t dyn Validator>,
}

impl WriteContext<'_> {
    /// Insert or replace `object`, with the same semantics as [`Store::save`]
    pub fn put<T: Persistable>(&mut self, object: &T, update: bool) -> Result<()> {
        check(self.validator, T::TYPE_NAME, object)?;
        Ok(engine::insert_or_replace(self.txn, object, update)?)
    }

    /// Remove the row for `object`. Returns whether a row existed.
    pub fn delete<T: Persistable>(&mut self, object: &T) -> Result<bool> {
        check(self.validator, T::TYPE_NAME, object)?;
        let key_bytes = engine::encode_key::<T>(&object.primary_key())?;
        Ok(engine::delete_row::<T>(self.txn, &key_bytes)?)
    }

    /// Remove the row of type `T` stored under `key`
    pub fn delete_key<T: Persistable>(&mut self, key: &T::Key) -> Result<bool> {
        let key_bytes = engine::encode_key::<T>(key)?;
        Ok(engine::delete_row::<T>(self.txn, &key_bytes)?)
    }

    pub fn get<T: Persistable>(&self, key: &T::Key) -> Result<Option<T>> {
        let key_bytes = engine::encode_key::<T>(key)?;
        Ok(engine::fetch_in_write(self.txn, &key_bytes)?)
    }
}
