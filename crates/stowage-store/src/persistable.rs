//! The capability every storable type implements

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A domain type that can be stored by the facade.
///
/// Each type gets its own table, named after [`Persistable::TYPE_NAME`]. Two
/// values of the same type with equal primary keys are the same logical row.
/// Values are stored as JSON, so any serde representation that round-trips
/// through `serde_json` is supported, including skipped optional fields.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use stowage_store::Persistable;
///
/// #[derive(Serialize, Deserialize)]
/// struct Bookmark {
///     url: String,
///     title: String,
/// }
///
/// impl Persistable for Bookmark {
///     const TYPE_NAME: &'static str = "bookmark";
///     type Key = String;
///
///     fn primary_key(&self) -> String {
///         self.url.clone()
///     }
/// }
/// ```
pub trait Persistable: Serialize + DeserializeOwned + 'static {
    /// Table name; must be unique among the types sharing a store
    const TYPE_NAME: &'static str;

    /// Primary key type. Keys are compared by their bincode encoding.
    type Key: Serialize + Debug;

    fn primary_key(&self) -> Self::Key;
}
