//! List and item documents
//!
//! One document per list, with its items embedded in insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a fresh document identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// == Todo Item ==
/// A single task entry embedded in exactly one list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    /// Creates an open item with a generated id, stamped now.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            done: false,
            created_at: Utc::now(),
        }
    }
}

// == Todo List ==
/// A named, owned collection of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoList {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub items: Vec<TodoItem>,
    pub created_at: DateTime<Utc>,
}

impl TodoList {
    /// Creates an empty list with a generated id, stamped now.
    pub fn new(name: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            user_id: user_id.into(),
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Returns the first item with the given id.
    pub fn item(&self, item_id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}
