//! Field-level error accumulator.
//!
//! A [`Validator`] is created fresh for every validation pass. Rules call
//! [`Validator::check`] unconditionally; the first message recorded for a
//! field sticks and later failures against the same field are ignored.

use std::collections::{BTreeMap, HashSet};

use crate::error::CoreError;

/// Field name to human-readable message. Ordered so that JSON output is stable.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Default, Clone)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no error has been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `field` unless the field already holds one.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Record `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    /// Convert the accumulated state into a `Result`, failing with
    /// [`CoreError::Validation`] when any field is invalid.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.valid() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.errors))
        }
    }
}

/// `true` when every item is distinct (exact string equality).
pub fn unique<S: AsRef<str>>(items: &[S]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().all(|item| seen.insert(item.as_ref()))
}

/// `true` when `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}
