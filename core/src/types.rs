//! Domain types shared by the model, the controllers and the views.
//!
//! # Design
//! `Todo` mirrors the mock-server's wire schema (`id`, `name`, `isDone`) but
//! is defined independently. Integration tests catch any drift between the two
//! crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a todo. Assigned by the data source, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub u64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TodoId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A single todo item.
///
/// Only `is_done` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub name: String,
    pub is_done: bool,
}

impl Todo {
    pub fn new(id: u64, name: impl Into<String>, is_done: bool) -> Self {
        Self {
            id: TodoId(id),
            name: name.into(),
            is_done,
        }
    }
}
