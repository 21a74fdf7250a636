//! Memory Store Module
//!
//! In-process document store: one `TodoList` document per id, items
//! embedded. Every call goes through the connection pool.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::{Config, PoolConfig};
use crate::error::{Result, TodoError};
use crate::models::{TodoItem, TodoList};
use crate::store::{sort_oldest_first, ConnectionPool, TodoStore, UpdateResult};

/// URL scheme served by this store.
pub const MEMORY_SCHEME: &str = "memory://";

// == Memory Store ==
/// Document store keeping list documents in a map keyed by list id.
#[derive(Debug)]
pub struct MemoryStore {
    /// Database name the documents belong to
    database: String,
    /// List documents keyed by id
    documents: RwLock<HashMap<String, TodoList>>,
    /// Connection budget shared by all operations
    pool: ConnectionPool,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store with the given pool settings.
    pub fn new(database: impl Into<String>, pool: PoolConfig) -> Result<Self> {
        Ok(Self {
            database: database.into(),
            documents: RwLock::new(HashMap::new()),
            pool: ConnectionPool::new(pool)?,
        })
    }

    /// Opens the store named by `config.database_url`.
    pub fn connect(config: &Config) -> Result<Self> {
        if !config.database_url.starts_with(MEMORY_SCHEME) {
            return Err(TodoError::Unavailable(format!(
                "unsupported store URL scheme in {:?}",
                config.database_url
            )));
        }

        let store = Self::new(config.database_name.clone(), config.pool.clone())?;
        info!(
            "Document store ready: database={}, pool={}..{}",
            store.database, config.pool.min_size, config.pool.max_size
        );
        Ok(store)
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    // == Insert ==
    async fn insert_list(&self, list: TodoList) -> Result<()> {
        self.pool
            .run(async {
                let mut documents = self.documents.write().await;
                if documents.contains_key(&list.id) {
                    return Err(TodoError::Conflict(format!(
                        "List '{}' already exists",
                        list.id
                    )));
                }
                documents.insert(list.id.clone(), list);
                Ok(())
            })
            .await?
    }

    // == Find ==
    async fn find_list(&self, list_id: &str) -> Result<Option<TodoList>> {
        self.pool
            .run(async { self.documents.read().await.get(list_id).cloned() })
            .await
    }

    async fn find_lists_by_user(&self, user_id: &str) -> Result<Vec<TodoList>> {
        self.pool
            .run(async {
                let documents = self.documents.read().await;
                let mut lists: Vec<TodoList> = documents
                    .values()
                    .filter(|list| list.user_id == user_id)
                    .cloned()
                    .collect();
                sort_oldest_first(&mut lists);
                lists
            })
            .await
    }

    // == Push ==
    async fn push_item(&self, list_id: &str, item: TodoItem) -> Result<UpdateResult> {
        self.pool
            .run(async {
                match self.documents.write().await.get_mut(list_id) {
                    Some(list) => {
                        list.items.push(item);
                        UpdateResult::new(1, 1)
                    }
                    None => UpdateResult::NONE,
                }
            })
            .await
    }

    // == Set ==
    async fn set_item_done(
        &self,
        list_id: &str,
        item_id: &str,
        done: bool,
    ) -> Result<UpdateResult> {
        self.pool
            .run(async {
                let mut documents = self.documents.write().await;
                let item = documents
                    .get_mut(list_id)
                    .and_then(|list| list.items.iter_mut().find(|item| item.id == item_id));

                match item {
                    Some(item) if item.done == done => UpdateResult::new(1, 0),
                    Some(item) => {
                        item.done = done;
                        UpdateResult::new(1, 1)
                    }
                    None => UpdateResult::NONE,
                }
            })
            .await
    }

    // == Pull ==
    async fn pull_item(&self, list_id: &str, item_id: &str) -> Result<UpdateResult> {
        self.pool
            .run(async {
                match self.documents.write().await.get_mut(list_id) {
                    Some(list) => {
                        let before = list.items.len();
                        list.items.retain(|item| item.id != item_id);
                        let modified = u64::from(list.items.len() != before);
                        UpdateResult::new(1, modified)
                    }
                    None => UpdateResult::NONE,
                }
            })
            .await
    }

    async fn ping(&self) -> Result<()> {
        self.pool.run(async {}).await
    }

    async fn close(&self) {
        self.pool.close();
    }
}
