//! API Handlers
//!
//! HTTP request handlers for each to-do list endpoint. Each handler makes at
//! most two store calls and maps the outcome straight to a response.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, warn};

use super::extract::ValidJson;
use crate::config::Config;
use crate::error::{Result, TodoError};
use crate::models::{
    AddItemRequest, CreateListRequest, HealthResponse, MessageResponse, TodoItem, TodoList,
};
use crate::store::TodoStore;

/// Application state shared across all handlers.
///
/// The store client is injected here rather than held globally.
#[derive(Clone)]
pub struct AppState {
    /// Document store client
    pub store: Arc<dyn TodoStore>,
    /// Shared secret checked by the key gate
    pub api_key: Arc<str>,
    /// Report an empty per-user query as 404 instead of `[]`
    pub empty_user_lists_not_found: bool,
}

impl AppState {
    /// Creates a new AppState with default query behaviour.
    pub fn new(store: Arc<dyn TodoStore>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            api_key: api_key.into(),
            empty_user_lists_not_found: true,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, store: Arc<dyn TodoStore>) -> Self {
        Self {
            empty_user_lists_not_found: config.empty_user_lists_not_found,
            ..Self::new(store, config.api_key.as_str())
        }
    }
}

/// Handler for POST /lists/
///
/// Stores the submitted list document, filling in omitted fields.
pub async fn create_list_handler(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateListRequest>,
) -> Result<(StatusCode, Json<TodoList>)> {
    if let Some(error_msg) = req.validate() {
        return Err(TodoError::Validation(error_msg));
    }

    let list = req.into_list();
    state.store.insert_list(list.clone()).await.map_err(log_unavailable)?;
    debug!("Created list {} for user {}", list.id, list.user_id);

    Ok((StatusCode::CREATED, Json(list)))
}

/// Handler for GET /lists/:list_id
pub async fn get_list_handler(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> Result<Json<TodoList>> {
    state
        .store
        .find_list(&list_id)
        .await
        .map_err(log_unavailable)?
        .map(Json)
        .ok_or_else(TodoError::list_not_found)
}

/// Handler for GET /lists/user/:user_id
///
/// An empty result is a 404 unless the state says otherwise.
pub async fn get_user_lists_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<TodoList>>> {
    let lists = state
        .store
        .find_lists_by_user(&user_id)
        .await
        .map_err(log_unavailable)?;

    if lists.is_empty() && state.empty_user_lists_not_found {
        return Err(TodoError::NotFound(
            "No lists found for this user".to_string(),
        ));
    }

    Ok(Json(lists))
}

/// Handler for POST /lists/:list_id/items/
///
/// The existence check and the append are a single conditional push.
pub async fn add_item_handler(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    ValidJson(req): ValidJson<AddItemRequest>,
) -> Result<(StatusCode, Json<TodoItem>)> {
    if let Some(error_msg) = req.validate() {
        return Err(TodoError::Validation(error_msg));
    }

    let item = req.into_item();
    let result = state
        .store
        .push_item(&list_id, item.clone())
        .await
        .map_err(log_unavailable)?;
    if result.matched == 0 {
        return Err(TodoError::list_not_found());
    }
    debug!("Added item {} to list {}", item.id, list_id);

    Ok((StatusCode::CREATED, Json(item)))
}

/// Handler for PUT /lists/:list_id/items/:item_id
///
/// Flips `done` and writes back only that field.
pub async fn toggle_item_handler(
    State(state): State<AppState>,
    Path((list_id, item_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    let list = state
        .store
        .find_list(&list_id)
        .await
        .map_err(log_unavailable)?
        .ok_or_else(TodoError::list_not_found)?;
    let done = list
        .item(&item_id)
        .map(|item| !item.done)
        .ok_or_else(TodoError::item_not_found)?;

    let result = state
        .store
        .set_item_done(&list_id, &item_id, done)
        .await
        .map_err(log_unavailable)?;
    // Item pulled between the read and the write
    if result.matched == 0 {
        return Err(TodoError::item_not_found());
    }
    debug!("Toggled item {} in list {} to done={}", item_id, list_id, done);

    Ok(Json(MessageResponse::item_updated()))
}

/// Handler for DELETE /lists/:list_id/items/:item_id
///
/// A missing list and a missing item both come back as "Item not found".
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path((list_id, item_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    let result = state
        .store
        .pull_item(&list_id, &item_id)
        .await
        .map_err(log_unavailable)?;
    if result.modified == 0 {
        return Err(TodoError::item_not_found());
    }
    debug!("Removed item {} from list {}", item_id, list_id);

    Ok(Json(MessageResponse::item_removed()))
}

/// Handler for GET /health
///
/// Healthy only while the store answers a ping.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    state.store.ping().await.map_err(log_unavailable)?;
    Ok(Json(HealthResponse::healthy()))
}

/// Fallback for paths no route matches.
pub async fn not_found_handler() -> TodoError {
    TodoError::NotFound("Route not found".to_string())
}

fn log_unavailable(err: TodoError) -> TodoError {
    if let TodoError::Unavailable(reason) = &err {
        warn!("Document store unavailable: {}", reason);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::store::MemoryStore;

    fn test_state() -> AppState {
        let store = MemoryStore::new("test", PoolConfig::default()).unwrap();
        AppState::new(Arc::new(store), "secret")
    }

    fn list_request(name: &str, user_id: &str) -> CreateListRequest {
        serde_json::from_value(serde_json::json!({ "name": name, "user_id": user_id })).unwrap()
    }

    fn item_request(text: &str) -> AddItemRequest {
        serde_json::from_value(serde_json::json!({ "text": text })).unwrap()
    }

    async fn create(state: &AppState) -> TodoList {
        let (status, Json(list)) =
            create_list_handler(State(state.clone()), ValidJson(list_request("Home", "u1")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        list
    }

    #[tokio::test]
    async fn test_create_and_get_list() {
        let state = test_state();
        let list = create(&state).await;

        let Json(found) = get_list_handler(State(state), Path(list.id.clone()))
            .await
            .unwrap();
        assert_eq!(found, list);
        assert!(found.items.is_empty());
    }

    #[tokio::test]
    async fn test_create_list_with_reserved_id() {
        let req: CreateListRequest = serde_json::from_value(
            serde_json::json!({ "id": "user", "name": "Home", "user_id": "u1" }),
        )
        .unwrap();
        let result = create_list_handler(State(test_state()), ValidJson(req)).await;
        assert!(matches!(result, Err(TodoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_missing_list() {
        let result = get_list_handler(State(test_state()), Path("nope".to_string())).await;
        assert!(matches!(result, Err(TodoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_item_to_missing_list() {
        let state = test_state();
        let result = add_item_handler(
            State(state.clone()),
            Path("nope".to_string()),
            ValidJson(item_request("Buy milk")),
        )
        .await;

        assert!(matches!(result, Err(TodoError::NotFound(_))));
        assert!(state.store.find_list("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_blank_item_is_rejected() {
        let state = test_state();
        let list = create(&state).await;
        let result = add_item_handler(
            State(state),
            Path(list.id),
            ValidJson(item_request("   ")),
        )
        .await;
        assert!(matches!(result, Err(TodoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_done() {
        let state = test_state();
        let list = create(&state).await;
        let (_, Json(item)) = add_item_handler(
            State(state.clone()),
            Path(list.id.clone()),
            ValidJson(item_request("Buy milk")),
        )
        .await
        .unwrap();

        let path = || Path((list.id.clone(), item.id.clone()));
        toggle_item_handler(State(state.clone()), path()).await.unwrap();
        let toggled = state.store.find_list(&list.id).await.unwrap().unwrap();
        assert!(toggled.items[0].done);

        toggle_item_handler(State(state.clone()), path()).await.unwrap();
        let restored = state.store.find_list(&list.id).await.unwrap().unwrap();
        assert!(!restored.items[0].done);
    }

    #[tokio::test]
    async fn test_toggle_distinguishes_list_and_item() {
        let state = test_state();
        let list = create(&state).await;

        let missing_list = toggle_item_handler(
            State(state.clone()),
            Path(("nope".to_string(), "x".to_string())),
        )
        .await;
        let missing_item =
            toggle_item_handler(State(state), Path((list.id, "x".to_string()))).await;

        assert_eq!(missing_list.unwrap_err().to_string(), "List not found");
        assert_eq!(missing_item.unwrap_err().to_string(), "Item not found");
    }

    #[tokio::test]
    async fn test_delete_missing_item_and_list_look_alike() {
        let state = test_state();
        let list = create(&state).await;

        let missing_item = delete_item_handler(
            State(state.clone()),
            Path((list.id, "x".to_string())),
        )
        .await;
        let missing_list =
            delete_item_handler(State(state), Path(("nope".to_string(), "x".to_string())))
                .await;

        assert_eq!(missing_item.unwrap_err().to_string(), "Item not found");
        assert_eq!(missing_list.unwrap_err().to_string(), "Item not found");
    }

    #[tokio::test]
    async fn test_user_lists_empty_policy() {
        let mut state = test_state();
        let result = get_user_lists_handler(State(state.clone()), Path("ghost".to_string())).await;
        assert!(matches!(result, Err(TodoError::NotFound(_))));

        state.empty_user_lists_not_found = false;
        let Json(lists) = get_user_lists_handler(State(state), Path("ghost".to_string()))
            .await
            .unwrap();
        assert!(lists.is_empty());
    }

    #[tokio::test]
    async fn test_health_handler() {
        let state = test_state();
        let Json(response) = health_handler(State(state.clone())).await.unwrap();
        assert_eq!(response.status, "healthy");

        state.store.close().await;
        let result = health_handler(State(state)).await;
        assert!(matches!(result, Err(TodoError::Unavailable(_))));
    }
}
