//! Error and safe-data accumulation.
//!
//! One `ResultStore` lives for one validation run. It is a plain accumulator:
//! errors keep insertion order and are never deduplicated (a field checked by
//! two failing rules yields two entries), and safe data is keyed by top-level
//! field name. The all-or-nothing guarantee (a failed run exposes no safe
//! data) is enforced by the pipeline via [`ResultStore::clear_safe`], not
//! here.

use serde::Serialize;
use serde_json::{Map, Value};

/// One recorded validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ResultStore {
    errors: Vec<ErrorEntry>,
    safe: Map<String, Value>,
}

impl ResultStore {
    pub(crate) fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ErrorEntry { field: field.into(), message: message.into() });
    }

    pub(crate) fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    pub(crate) fn errors_for<'a>(&'a self, field: &str) -> Vec<&'a ErrorEntry> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    pub(crate) fn first_error(&self) -> Option<&ErrorEntry> {
        self.errors.first()
    }

    pub(crate) fn last_error(&self) -> Option<&ErrorEntry> {
        self.errors.last()
    }

    pub(crate) fn is_fail(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn set_safe(&mut self, field: &str, value: Value) {
        self.safe.insert(field.to_string(), value);
    }

    pub(crate) fn safe_data(&self) -> &Map<String, Value> {
        &self.safe
    }

    pub(crate) fn clear_safe(&mut self) {
        self.safe.clear();
    }

    pub(crate) fn reset(&mut self) {
        self.errors.clear();
        self.safe.clear();
    }
}
