//! Row-level primitives on top of redb transactions
//!
//! Every persistable type lives in its own `rows/<type name>` table keyed by
//! the bincode encoding of its primary key. Values are a small bincode
//! envelope carrying the row's insertion sequence, so sorted reads can break
//! ties deterministically, and the object itself as JSON. Keys and the envelope
//! stay bincode; the payload has to be self-describing so that serde attributes
//! such as `skip_serializing_if`, `flatten` or untagged enums read back.

use crate::error::EngineError;
use crate::Persistable;
use redb::{ReadTransaction, ReadableTable, TableDefinition, TableError, WriteTransaction};
use serde::{Deserialize, Serialize};

/// Next insertion sequence per type name
pub(crate) const SEQUENCE_TABLE: TableDefinition<&str, u64> =
    TableDefinition::new("stowage_sequences");

#[derive(Debug, Serialize, Deserialize)]
struct StoredRow {
    seq: u64,
    payload: Vec<u8>,
}

/// A decoded row together with its insertion sequence
#[derive(Debug)]
pub(crate) struct Row<T> {
    pub seq: u64,
    pub value: T,
}

const ROWS_TABLE_PREFIX: &str = "rows/";

fn rows_table_name<T: Persistable>() -> String {
    format!("{}{}", ROWS_TABLE_PREFIX, T::TYPE_NAME)
}

fn rows_table(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

pub(crate) fn encode_key<T: Persistable>(key: &T::Key) -> Result<Vec<u8>, EngineError> {
    Ok(bincode::serialize(key)?)
}

fn decode_row<T: Persistable>(bytes: &[u8]) -> Result<Row<T>, EngineError> {
    let stored: StoredRow = bincode::deserialize(bytes)?;
    Ok(Row {
        seq: stored.seq,
        value: serde_json::from_slice(&stored.payload)?,
    })
}

fn next_sequence(txn: &WriteTransaction, type_name: &str) -> Result<u64, EngineError> {
    let mut sequences = txn.open_table(SEQUENCE_TABLE)?;
    let next = match sequences.get(type_name)? {
        Some(current) => current.value() + 1,
        None => 0,
    };
    sequences.insert(type_name, next)?;
    Ok(next)
}

/// Insert `object`, or replace the row with the same key when `overwrite` is set.
///
/// A replaced row keeps its original insertion sequence. Without `overwrite`
/// an existing key is a `DuplicateKey` error.
pub(crate) fn insert_or_replace<T: Persistable>(
    txn: &WriteTransaction,
    object: &T,
    overwrite: bool,
) -> Result<(), EngineError> {
    let key = object.primary_key();
    let key_bytes = encode_key::<T>(&key)?;
    let payload = serde_json::to_vec(object)?;

    let mut table = txn.open_table(rows_table(&rows_table_name::<T>()))?;
    let existing_seq = match table.get(key_bytes.as_slice())? {
        Some(bytes) => Some(bincode::deserialize::<StoredRow>(bytes.value())?.seq),
        None => None,
    };

    let seq = match existing_seq {
        Some(_) if !overwrite => {
            return Err(EngineError::DuplicateKey {
                type_name: T::TYPE_NAME,
                key: format!("{:?}", key),
            });
        }
        Some(seq) => seq,
        None => next_sequence(txn, T::TYPE_NAME)?,
    };

    let bytes = bincode::serialize(&StoredRow { seq, payload })?;
    table.insert(key_bytes.as_slice(), bytes.as_slice())?;
    Ok(())
}

/// Remove the row stored under `key_bytes`. Returns whether a row existed.
pub(crate) fn delete_row<T: Persistable>(
    txn: &WriteTransaction,
    key_bytes: &[u8],
) -> Result<bool, EngineError> {
    let mut table = txn.open_table(rows_table(&rows_table_name::<T>()))?;
    let removed = table.remove(key_bytes)?.is_some();
    Ok(removed)
}

fn lookup<T, R>(table: &R, key_bytes: &[u8]) -> Result<Option<T>, EngineError>
where
    T: Persistable,
    R: ReadableTable<&'static [u8], &'static [u8]>,
{
    match table.get(key_bytes)? {
        Some(bytes) => Ok(Some(decode_row::<T>(bytes.value())?.value)),
        None => Ok(None),
    }
}

/// Point lookup against a read snapshot
pub(crate) fn fetch_by_key<T: Persistable>(
    txn: &ReadTransaction,
    key_bytes: &[u8],
) -> Result<Option<T>, EngineError> {
    match txn.open_table(rows_table(&rows_table_name::<T>())) {
        Ok(table) => lookup(&table, key_bytes),
        // Nothing of this type has been written yet
        Err(TableError::TableDoesNotExist(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Point lookup that observes the uncommitted writes of `txn`
pub(crate) fn fetch_in_write<T: Persistable>(
    txn: &WriteTransaction,
    key_bytes: &[u8],
) -> Result<Option<T>, EngineError> {
    let table = txn.open_table(rows_table(&rows_table_name::<T>()))?;
    lookup(&table, key_bytes)
}

/// All rows of `T` in key order
pub(crate) fn fetch_all<T: Persistable>(txn: &ReadTransaction) -> Result<Vec<Row<T>>, EngineError> {
    let table = match txn.open_table(rows_table(&rows_table_name::<T>())) {
        Ok(table) => table,
        Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut rows = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        rows.push(decode_row::<T>(value.value())?);
    }
    Ok(rows)
}
