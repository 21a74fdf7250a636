//! Request DTOs for the to-do list API
//!
//! Defines the structure of incoming HTTP request bodies. Optional fields
//! are filled in when the request is turned into a document.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::list::{new_id, TodoItem, TodoList};

/// Path segment `/lists/user/...` claims; a list with this id is unreachable.
pub const RESERVED_LIST_ID: &str = "user";

/// Checks a caller-supplied id can be used as a single path segment.
fn validate_id(kind: &str, id: Option<&str>) -> Option<String> {
    let id = id?;
    if id.trim().is_empty() {
        return Some(format!("{kind} id cannot be empty"));
    }
    if id.contains('/') {
        return Some(format!("{kind} id cannot contain '/'"));
    }
    None
}

/// Request body for creating a list (POST /lists/)
///
/// `name` and `user_id` are required; the rest default.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<AddItemRequest>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CreateListRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(error_msg) = validate_id("List", self.id.as_deref()) {
            return Some(error_msg);
        }
        if self.id.as_deref() == Some(RESERVED_LIST_ID) {
            return Some(format!("List id '{RESERVED_LIST_ID}' is reserved"));
        }
        self.items.iter().find_map(AddItemRequest::validate)
    }

    /// Builds the list document, generating any omitted id or timestamp.
    pub fn into_list(self) -> TodoList {
        TodoList {
            id: self.id.unwrap_or_else(new_id),
            name: self.name,
            user_id: self.user_id,
            items: self.items.into_iter().map(AddItemRequest::into_item).collect(),
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Request body for adding an item (POST /lists/{list_id}/items/)
#[derive(Debug, Clone, Deserialize)]
pub struct AddItemRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AddItemRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(error_msg) = validate_id("Item", self.id.as_deref()) {
            return Some(error_msg);
        }
        if self.text.trim().is_empty() {
            return Some("Item text cannot be empty".to_string());
        }
        None
    }

    /// Builds the item document, generating any omitted id or timestamp.
    pub fn into_item(self) -> TodoItem {
        TodoItem {
            id: self.id.unwrap_or_else(new_id),
            text: self.text,
            done: self.done,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}
