//! Connection Registry trait 定義
//!
//! 接続 identity から「どのルームの、どの表示名か」を引くためのインターフェース。
//! 登録内容は `(room code, display name)` への弱い参照であり、Room 側からは参照しない。

use async_trait::async_trait;

use super::{ConnectionId, DisplayName, RoomCode};

/// Where a connection currently belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub room_code: RoomCode,
    pub display_name: DisplayName,
}

impl Binding {
    pub fn new(room_code: RoomCode, display_name: DisplayName) -> Self {
        Self {
            room_code,
            display_name,
        }
    }
}

#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Bind `identity`, replacing any previous binding of that identity
    async fn bind(&self, identity: ConnectionId, binding: Binding);

    async fn resolve(&self, identity: &ConnectionId) -> Option<Binding>;

    /// Remove and return the binding of `identity`
    async fn unbind(&self, identity: &ConnectionId) -> Option<Binding>;

    /// Number of bound identities
    async fn count(&self) -> usize;
}
