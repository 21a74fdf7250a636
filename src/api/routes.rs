//! API Routes
//!
//! Configures the Axum router with all to-do list endpoints.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::auth::require_api_key;
use super::handlers::{
    add_item_handler, create_list_handler, delete_item_handler, get_list_handler,
    get_user_lists_handler, health_handler, not_found_handler, toggle_item_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - API key gate on every `/lists` route, ahead of body parsing
/// - Unmatched paths get the JSON 404 body
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let lists = Router::new()
        .route("/lists/", post(create_list_handler))
        .route("/lists/:list_id", get(get_list_handler))
        .route("/lists/user/:user_id", get(get_user_lists_handler))
        .route("/lists/:list_id/items/", post(add_item_handler))
        .route(
            "/lists/:list_id/items/:item_id",
            put(toggle_item_handler).delete(delete_item_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(lists)
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
