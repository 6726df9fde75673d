use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - chat page and schema selection
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::home).post(handlers::ui::submit))
        .route("/update_db_id", post(handlers::ui::update_db_id))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - read-only JSON views
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            .route("/schemas", get(handlers::api::list_schemas))
            .route("/history", get(handlers::api::history))
            .route("/status", get(handlers::api::system_status)),
    )
}
