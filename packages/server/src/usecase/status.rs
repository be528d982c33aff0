//! UseCase: サーバー状態とルーム情報の参照（HTTP API 用）

use std::sync::Arc;

use quizroom_shared::time::{Clock, timestamp_to_rfc3339};

use crate::{
    domain::{ConnectionRegistry, MessagePusher, RoomCode, RoomRepository},
    infrastructure::dto::http::{RoomInfoDto, ServerStatusDto},
};

use super::error::SessionError;

pub struct StatusUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl StatusUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            message_pusher,
            clock,
        }
    }

    pub async fn status(&self) -> ServerStatusDto {
        ServerStatusDto {
            status: "online".to_string(),
            total_rooms: self.repository.count_rooms().await,
            total_users: self.registry.count().await,
            total_connections: self.message_pusher.client_count().await,
            timestamp: timestamp_to_rfc3339(self.clock.now_millis()),
        }
    }

    /// ルームの概要。コードの大文字小文字は区別しない。
    pub async fn room_info(&self, code: &str) -> Result<RoomInfoDto, SessionError> {
        let code = RoomCode::new(code.to_string())?;
        let room = self
            .repository
            .get_room(&code)
            .await
            .ok_or_else(SessionError::room_not_found)?;
        let room = room.lock().await;
        Ok((&*room).into())
    }
}
