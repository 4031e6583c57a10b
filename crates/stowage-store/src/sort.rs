//! Ordering rows by a named field

use crate::error::{Result, StoreError};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// Resolve a dotted key path (`"address.city"`) inside a serialized row
fn resolve<'v>(value: &'v Value, key_path: &str) -> Option<&'v Value> {
    key_path
        .split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Extract the sort value of `object` at `key_path`.
///
/// A path that leads nowhere on this row sorts as null, the same as a skipped
/// optional field, so the result never depends on which rows happen to exist.
/// A path that ends on an array or map is rejected; that can only be seen on a
/// row that exists, so an empty table sorts fine under any path.
pub(crate) fn sort_value<T: Serialize>(object: &T, key_path: &str) -> Result<Value> {
    let serialized = serde_json::to_value(object)
        .map_err(|e| StoreError::InvalidSortKey(format!("{}: {}", key_path, e)))?;

    match resolve(&serialized, key_path) {
        Some(Value::Array(_)) | Some(Value::Object(_)) => Err(StoreError::InvalidSortKey(format!(
            "{} does not name a scalar field",
            key_path
        ))),
        Some(value) => Ok(value.clone()),
        None => Ok(Value::Null),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over scalar values. Nulls sort first.
pub(crate) fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x.cmp(&y)
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x.cmp(&y)
            } else {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Address {
        city: String,
    }

    #[derive(Serialize)]
    struct Person {
        name: String,
        age: Option<u32>,
        address: Address,
        tags: Vec<String>,
    }

    fn person(age: Option<u32>) -> Person {
        Person {
            name: "Ada".to_string(),
            age,
            address: Address {
                city: "London".to_string(),
            },
            tags: vec![],
        }
    }

    #[test]
    fn test_nested_key_path() {
        let value = sort_value(&person(Some(36)), "address.city").unwrap();
        assert_eq!(value, json!("London"));
    }

    #[test]
    fn test_optional_field_sorts_as_null() {
        assert_eq!(sort_value(&person(None), "age").unwrap(), Value::Null);
    }

    #[test]
    fn test_missing_path_sorts_as_null() {
        assert_eq!(sort_value(&person(Some(36)), "height").unwrap(), Value::Null);
        assert_eq!(sort_value(&person(Some(36)), "name.first").unwrap(), Value::Null);
        assert_eq!(sort_value(&person(Some(36)), "address.zip").unwrap(), Value::Null);
    }

    #[test]
    fn test_rejects_non_scalar_fields() {
        assert!(matches!(
            sort_value(&person(None), "tags"),
            Err(StoreError::InvalidSortKey(_))
        ));
        assert!(matches!(
            sort_value(&person(None), "address"),
            Err(StoreError::InvalidSortKey(_))
        ));
    }

    #[test]
    fn test_compare_numbers_across_representations() {
        assert_eq!(compare(&json!(-3), &json!(2)), Ordering::Less);
        assert_eq!(compare(&json!(u64::MAX), &json!(1)), Ordering::Greater);
        assert_eq!(compare(&json!(1.5), &json!(1)), Ordering::Greater);
        assert_eq!(compare(&json!(null), &json!(0)), Ordering::Less);
        assert_eq!(compare(&json!("b"), &json!("a")), Ordering::Greater);
    }
}
