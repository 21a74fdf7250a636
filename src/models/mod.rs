//! Documents and DTOs for the to-do list API
//!
//! `list` holds the persisted document shapes; `requests` and `responses`
//! define the HTTP request and response bodies.

pub mod list;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use list::{TodoItem, TodoList};
pub use requests::{AddItemRequest, CreateListRequest};
pub use responses::{HealthResponse, MessageResponse};
