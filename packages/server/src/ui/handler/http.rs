//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{RoomInfoDto, ServerStatusDto},
    ui::state::AppState,
    usecase::SessionError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Server-wide counters
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ServerStatusDto> {
    Json(state.status_usecase.status().await)
}

/// Get room info by code
pub async fn get_room_info(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RoomInfoDto>, (StatusCode, Json<serde_json::Value>)> {
    match state.status_usecase.room_info(&code).await {
        Ok(info) => Ok(Json(info)),
        Err(SessionError::NotFound(message)) => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": message})),
        )),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e.to_string()})),
        )),
    }
}
