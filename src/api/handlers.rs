//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, Json},
};
use tracing::{error, info, warn};

use crate::{
    services::{NotificationId, SettingsStore},
    state::{AppState, SNOOZE_MINUTES},
    tasks::BreakEvent,
};
use super::responses::{ApiResponse, HealthResponse, SettingsPayload, StatusResponse};

const SETTINGS_PAGE: &str = include_str!("../../assets/settings.html");

/// Handle GET / - Serve the settings page
pub async fn settings_page_handler() -> Html<&'static str> {
    Html(SETTINGS_PAGE)
}

/// Handle GET /settings - Return the stored break interval
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SettingsPayload>, StatusCode> {
    match state.store.break_interval().await {
        Ok(minutes) => Ok(Json(SettingsPayload {
            break_interval: i64::from(minutes),
        })),
        Err(e) => {
            error!("Failed to read break interval: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /settings - Store a new break interval
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SettingsPayload>, JsonRejection>,
) -> Result<Json<ApiResponse>, StatusCode> {
    // Anything that is not a whole number of minutes is a bad request
    let Json(payload) = payload.map_err(|e| {
        warn!("Rejected settings payload: {}", e.body_text());
        StatusCode::BAD_REQUEST
    })?;

    let minutes = match u32::try_from(payload.break_interval) {
        Ok(minutes) if minutes > 0 => minutes,
        _ => {
            warn!("Rejected break interval {}", payload.break_interval);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    if let Err(e) = state.store.set_break_interval(minutes).await {
        error!("Failed to store break interval: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    info!("Break interval set to {} minutes", minutes);

    // The service rereads the store; a failure here only delays the change
    if let Err(e) = state.send_event("settings", BreakEvent::SettingsChanged) {
        warn!("Settings saved but not applied: {}", e);
    }

    Ok(Json(ApiResponse::ok("Settings saved".to_string())))
}

/// Handle POST /snooze - Suspend reminders for ten minutes
pub async fn snooze_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.send_event("snooze", BreakEvent::Snooze) {
        Ok(()) => Ok(Json(ApiResponse::snoozed(format!(
            "Snoozed for {} minutes",
            SNOOZE_MINUTES
        )))),
        Err(e) => {
            error!("Failed to snooze: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /notifications/:notification_id/buttons/:button_index - Button callback
pub async fn button_clicked_handler(
    State(state): State<Arc<AppState>>,
    Path((notification_id, button_index)): Path<(NotificationId, usize)>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let event = BreakEvent::ButtonClicked {
        notification_id,
        button_index,
    };

    match state.send_event("button", event) {
        Ok(()) => Ok(Json(ApiResponse::ok(format!(
            "Button {} on notification {} received",
            button_index, notification_id
        )))),
        Err(e) => {
            error!("Failed to forward button click: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle GET /status - Return current break status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        break_status: state.get_status(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
