//! Todo Lists - A list-of-lists task manager API
//!
//! Translates HTTP calls into reads and writes of list documents held in a
//! document store, behind a shared API key.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use api::AppState;
pub use config::Config;
pub use store::{MemoryStore, MongoStore, TodoStore};
