//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## ロック順序
//!
//! インデックス（`rooms`）のロックを取ってから個々の Room のロックを取る。逆順は禁止。
//! インデックスのロックは検索・挿入・削除の間だけ保持する。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, DisplayName, Question, RepositoryError, Room, RoomCode, RoomCodeGenerator,
    RoomRepository, SharedRoom, Timestamp,
};

/// Collisions tolerated per `create_room` before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 64;

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// Key: room code
    rooms: Mutex<HashMap<RoomCode, SharedRoom>>,
    code_generator: Arc<dyn RoomCodeGenerator>,
    /// Questions every new room starts with
    question_bank: Vec<Question>,
    chat_capacity: usize,
    max_rooms: usize,
}

impl InMemoryRoomRepository {
    pub fn new(
        code_generator: Arc<dyn RoomCodeGenerator>,
        question_bank: Vec<Question>,
        chat_capacity: usize,
        max_rooms: usize,
    ) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            code_generator,
            question_bank,
            chat_capacity,
            max_rooms,
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(
        &self,
        host_identity: ConnectionId,
        host_display_name: DisplayName,
        now: Timestamp,
    ) -> Result<SharedRoom, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.len() >= self.max_rooms {
            return Err(RepositoryError::RoomCapacityExceeded(self.max_rooms));
        }

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = self.code_generator.generate();
            if rooms.contains_key(&code) {
                tracing::debug!("Room code '{}' collided, regenerating", code);
                continue;
            }

            let room = Arc::new(Mutex::new(Room::new(
                code.clone(),
                host_identity,
                host_display_name,
                self.question_bank.clone(),
                self.chat_capacity,
                now,
            )));
            rooms.insert(code, room.clone());
            return Ok(room);
        }

        Err(RepositoryError::RoomCodeExhausted(MAX_CODE_ATTEMPTS))
    }

    async fn get_room(&self, code: &RoomCode) -> Option<SharedRoom> {
        let rooms = self.rooms.lock().await;
        rooms.get(code).cloned()
    }

    async fn evict_idle(&self, now: Timestamp, idle_threshold_millis: i64) -> Vec<RoomCode> {
        let mut rooms = self.rooms.lock().await;

        // A room that is locked right now is in use, so it is not idle.
        let mut evicted = Vec::new();
        for (code, room) in rooms.iter() {
            if let Ok(mut room) = room.try_lock()
                && room.is_idle(now, idle_threshold_millis)
            {
                room.quiz.cancel_pending();
                evicted.push(code.clone());
            }
        }

        for code in &evicted {
            rooms.remove(code);
        }
        evicted
    }

    async fn count_rooms(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.len()
    }
}
