//! Store Module
//!
//! The document-store client seam. Handlers only ever talk to a
//! [`TodoStore`]; the concrete store is chosen at start-up from the URL
//! scheme and injected through the application state.

mod memory;
mod mongo;
mod pool;

#[cfg(test)]
mod property_tests;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{Result, TodoError};
use crate::models::{TodoItem, TodoList};

// Re-export public types
pub use memory::{MemoryStore, MEMORY_SCHEME};
pub use mongo::MongoStore;
pub use pool::ConnectionPool;

// == Update Result ==
/// Outcome of a single update call, as reported by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents matched by the filter
    pub matched: u64,
    /// Documents actually changed
    pub modified: u64,
}

impl UpdateResult {
    pub const NONE: Self = Self {
        matched: 0,
        modified: 0,
    };

    pub fn new(matched: u64, modified: u64) -> Self {
        Self { matched, modified }
    }
}

// == Todo Store ==
/// Document store operations over list documents.
///
/// Each update is a single store call; callers needing an existence check
/// alongside a write should rely on `matched` rather than a prior read.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Inserts a new list document. Fails with `Conflict` if the id is taken.
    async fn insert_list(&self, list: TodoList) -> Result<()>;

    /// Looks a list up by id.
    async fn find_list(&self, list_id: &str) -> Result<Option<TodoList>>;

    /// Returns every list owned by `user_id`, oldest first.
    async fn find_lists_by_user(&self, user_id: &str) -> Result<Vec<TodoList>>;

    /// Appends `item` to the list with `list_id`, if it exists.
    async fn push_item(&self, list_id: &str, item: TodoItem) -> Result<UpdateResult>;

    /// Sets `done` on the first item matching `item_id` in the list.
    async fn set_item_done(&self, list_id: &str, item_id: &str, done: bool)
        -> Result<UpdateResult>;

    /// Removes every item matching `item_id` from the list.
    async fn pull_item(&self, list_id: &str, item_id: &str) -> Result<UpdateResult>;

    /// Round-trips to the store.
    async fn ping(&self) -> Result<()>;

    /// Releases store connections. Later calls fail as unavailable.
    async fn close(&self);
}

/// Orders lists by creation time, then id.
pub(crate) fn sort_oldest_first(lists: &mut [TodoList]) {
    lists.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Opens the store named by `config.database_url`.
///
/// `mongodb://` and `mongodb+srv://` go to MongoDB, `memory://` stays in
/// process.
pub async fn connect(config: &Config) -> Result<Arc<dyn TodoStore>> {
    let url = config.database_url.as_str();
    if url.starts_with(MEMORY_SCHEME) {
        Ok(Arc::new(MemoryStore::connect(config)?))
    } else if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
        Ok(Arc::new(MongoStore::connect(config).await?))
    } else {
        Err(TodoError::Unavailable(format!(
            "unsupported store URL scheme in {url:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_picks_memory_store() {
        let config = Config {
            database_url: "memory://localhost".to_string(),
            ..Config::default()
        };
        let store = connect(&config).await.unwrap();
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_rejects_unknown_scheme() {
        let config = Config {
            database_url: "postgres://localhost/todo".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            connect(&config).await,
            Err(TodoError::Unavailable(_))
        ));
    }
}
