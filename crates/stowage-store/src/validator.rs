//! Pluggable write gating

use crate::error::ValidationError;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// A caller-supplied predicate consulted before the store persists a value.
///
/// Returning `Ok(false)` and returning `Err` are treated the same way by the
/// facade: the write is abandoned with `StoreError::ValidationFailed`.
pub trait Validator: Send + Sync {
    fn is_validated(&self, value: &dyn Any) -> Result<bool, ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&dyn Any) -> Result<bool, ValidationError> + Send + Sync,
{
    fn is_validated(&self, value: &dyn Any) -> Result<bool, ValidationError> {
        self(value)
    }
}

/// Validates values of one concrete type and passes every other type through.
pub struct TypedValidator<T, F> {
    check: F,
    _type: PhantomData<fn(&T)>,
}

impl<T, F> TypedValidator<T, F>
where
    T: 'static,
    F: Fn(&T) -> Result<bool, ValidationError> + Send + Sync,
{
    pub fn new(check: F) -> Self {
        Self {
            check,
            _type: PhantomData,
        }
    }
}

impl<T, F> Validator for TypedValidator<T, F>
where
    T: 'static,
    F: Fn(&T) -> Result<bool, ValidationError> + Send + Sync,
{
    fn is_validated(&self, value: &dyn Any) -> Result<bool, ValidationError> {
        match value.downcast_ref::<T>() {
            Some(typed) => (self.check)(typed),
            None => Ok(true),
        }
    }
}

impl<T, F> fmt::Debug for TypedValidator<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedValidator")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}
