//! HTTP API module
//!
//! This module contains the settings surface, the snooze and notification
//! button endpoints, and the status endpoints.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(settings_page_handler))
        .route(
            "/settings",
            get(get_settings_handler).post(update_settings_handler),
        )
        .route("/snooze", post(snooze_handler))
        .route(
            "/notifications/:notification_id/buttons/:button_index",
            post(button_clicked_handler),
        )
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
