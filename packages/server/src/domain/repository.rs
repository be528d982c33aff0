//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ConnectionId, DisplayName, RepositoryError, Room, RoomCode, Timestamp};

/// A room behind its own lock.
///
/// Every mutation of a room (inbound message or timer callback) happens while
/// holding this lock, so no two mutations of one room interleave.
pub type SharedRoom = Arc<Mutex<Room>>;

/// Room Store
///
/// 全ての `Room` 集約を所有するストアへのインターフェース。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Create a room with a fresh unique code and the host as first player
    async fn create_room(
        &self,
        host_identity: ConnectionId,
        host_display_name: DisplayName,
        now: Timestamp,
    ) -> Result<SharedRoom, RepositoryError>;

    /// Look up a live room
    async fn get_room(&self, code: &RoomCode) -> Option<SharedRoom>;

    /// Remove every idle room, returning the evicted codes
    async fn evict_idle(&self, now: Timestamp, idle_threshold_millis: i64) -> Vec<RoomCode>;

    /// Number of live rooms
    async fn count_rooms(&self) -> usize;
}
