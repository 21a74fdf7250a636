//! API Module
//!
//! HTTP handlers and routing for the to-do list REST API.
//!
//! # Endpoints
//! - `POST /lists/` - Create a list
//! - `GET /lists/:list_id` - Fetch a list
//! - `GET /lists/user/:user_id` - Fetch every list owned by a user
//! - `POST /lists/:list_id/items/` - Append an item
//! - `PUT /lists/:list_id/items/:item_id` - Toggle an item
//! - `DELETE /lists/:list_id/items/:item_id` - Remove an item
//! - `GET /health` - Health check endpoint
//!
//! Everything under `/lists` requires the `x-api-key` header.

pub mod auth;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use auth::{require_api_key, API_KEY_HEADER};
pub use extract::ValidJson;
pub use handlers::*;
pub use routes::create_router;
