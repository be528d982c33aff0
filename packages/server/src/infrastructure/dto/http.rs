//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::QuizStatus;

/// `GET /api/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatusDto {
    pub status: String,
    pub total_rooms: usize,
    /// Connections bound to a room
    pub total_users: usize,
    /// Open WebSocket connections
    pub total_connections: usize,
    /// RFC 3339
    pub timestamp: String,
}

/// `GET /api/rooms/{code}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfoDto {
    pub code: String,
    pub total_players: usize,
    pub players: Vec<String>,
    pub status: QuizStatus,
    pub current_index: i64,
    pub question_started_at: Option<i64>,
    pub time_limit_seconds: Option<u32>,
    /// RFC 3339
    pub created_at: String,
}
