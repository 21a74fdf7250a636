//! Mongo Store Module
//!
//! MongoDB-backed document store. One document per list in the `todos`
//! collection, items embedded; the item verbs are single `update_one` calls.

use std::future::IntoFuture;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Document},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions, Tls, TlsOptions},
    Client, Collection, Database, IndexModel,
};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, TodoError};
use crate::models::{TodoItem, TodoList};
use crate::store::{sort_oldest_first, TodoStore, UpdateResult};

/// Collection holding the list documents.
pub const LISTS_COLLECTION: &str = "todos";

const DUPLICATE_KEY: i32 = 11000;

// == Mongo Store ==
/// Document store backed by a MongoDB deployment.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    lists: Collection<TodoList>,
    /// Budget for a single operation
    socket_timeout: Duration,
}

impl MongoStore {
    // == Constructor ==
    /// Connects to `config.database_url` and ensures the collection indexes.
    ///
    /// The driver owns the connection pool; its bounds and timeouts come
    /// from `config.pool`.
    pub async fn connect(config: &Config) -> Result<Self> {
        let mut options = ClientOptions::parse(config.database_url.as_str())
            .await
            .map_err(map_store_error)?;
        apply_config(&mut options, config);

        let client = Client::with_options(options).map_err(map_store_error)?;
        let database = client.database(&config.database_name);
        let store = Self {
            lists: database.collection(LISTS_COLLECTION),
            database,
            client,
            socket_timeout: config.pool.socket_timeout,
        };

        store.ensure_indexes().await?;
        info!(
            "Document store ready: database={}, pool={}..{}, tls={}",
            config.database_name, config.pool.min_size, config.pool.max_size, config.store_tls
        );
        Ok(store)
    }

    /// Unique list ids make a duplicate insert fail instead of shadowing.
    async fn ensure_indexes(&self) -> Result<()> {
        let by_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let by_user = IndexModel::builder().keys(doc! { "user_id": 1 }).build();

        self.run(self.lists.create_index(by_id)).await?;
        self.run(self.lists.create_index(by_user)).await?;
        Ok(())
    }

    /// Runs one driver call under the socket timeout.
    async fn run<F, T>(&self, op: F) -> Result<T>
    where
        F: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        timeout(self.socket_timeout, op.into_future())
            .await
            .map_err(|_| {
                warn!("Store operation exceeded socket timeout");
                TodoError::Unavailable("store operation timed out".to_string())
            })?
            .map_err(map_store_error)
    }
}

#[async_trait]
impl TodoStore for MongoStore {
    async fn insert_list(&self, list: TodoList) -> Result<()> {
        self.run(self.lists.insert_one(&list))
            .await
            .map_err(|err| match err {
                TodoError::Conflict(_) => {
                    TodoError::Conflict(format!("List '{}' already exists", list.id))
                }
                other => other,
            })?;
        Ok(())
    }

    async fn find_list(&self, list_id: &str) -> Result<Option<TodoList>> {
        self.run(self.lists.find_one(list_filter(list_id))).await
    }

    async fn find_lists_by_user(&self, user_id: &str) -> Result<Vec<TodoList>> {
        let mut lists: Vec<TodoList> = self
            .run(async {
                self.lists
                    .find(doc! { "user_id": user_id })
                    .await?
                    .try_collect::<Vec<TodoList>>()
                    .await
            })
            .await?;
        sort_oldest_first(&mut lists);
        Ok(lists)
    }

    async fn push_item(&self, list_id: &str, item: TodoItem) -> Result<UpdateResult> {
        let update = push_item_update(&item)?;
        let result = self
            .run(self.lists.update_one(list_filter(list_id), update))
            .await?;
        Ok(UpdateResult::new(result.matched_count, result.modified_count))
    }

    async fn set_item_done(
        &self,
        list_id: &str,
        item_id: &str,
        done: bool,
    ) -> Result<UpdateResult> {
        let result = self
            .run(
                self.lists
                    .update_one(item_filter(list_id, item_id), set_done_update(done)),
            )
            .await?;
        Ok(UpdateResult::new(result.matched_count, result.modified_count))
    }

    async fn pull_item(&self, list_id: &str, item_id: &str) -> Result<UpdateResult> {
        let result = self
            .run(
                self.lists
                    .update_one(list_filter(list_id), pull_item_update(item_id)),
            )
            .await?;
        Ok(UpdateResult::new(result.matched_count, result.modified_count))
    }

    async fn ping(&self) -> Result<()> {
        self.run(self.database.run_command(doc! { "ping": 1 }))
            .await?;
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().immediate(true).await;
    }
}

// == Driver Options ==
/// Copies pool bounds, timeouts and TLS settings onto the parsed options.
fn apply_config(options: &mut ClientOptions, config: &Config) {
    let pool = &config.pool;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.min_pool_size = Some(u32::try_from(pool.min_size).unwrap_or(u32::MAX));
    options.max_pool_size = Some(u32::try_from(pool.max_size).unwrap_or(u32::MAX));
    options.connect_timeout = Some(pool.connect_timeout);
    options.server_selection_timeout = Some(pool.server_selection_timeout);

    // Without STORE_TLS the URL's own tls setting applies
    if config.store_tls {
        let mut tls = TlsOptions::default();
        tls.allow_invalid_certificates = Some(config.store_tls_allow_invalid_certificates);
        options.tls = Some(Tls::Enabled(tls));
    }
}

// == Filters and Updates ==
fn list_filter(list_id: &str) -> Document {
    doc! { "id": list_id }
}

fn item_filter(list_id: &str, item_id: &str) -> Document {
    doc! { "id": list_id, "items.id": item_id }
}

fn push_item_update(item: &TodoItem) -> Result<Document> {
    let item = to_bson(item).map_err(|err| TodoError::Internal(err.to_string()))?;
    Ok(doc! { "$push": { "items": item } })
}

/// Positional update touching only the matched item's `done`.
fn set_done_update(done: bool) -> Document {
    doc! { "$set": { "items.$.done": done } }
}

fn pull_item_update(item_id: &str) -> Document {
    doc! { "$pull": { "items": { "id": item_id } } }
}

fn map_store_error(err: mongodb::error::Error) -> TodoError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY => {
            TodoError::Conflict(write.message.clone())
        }
        ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
            TodoError::Internal(err.to_string())
        }
        _ => {
            warn!("Document store error: {}", err);
            TodoError::Unavailable(err.to_string())
        }
    }
}
