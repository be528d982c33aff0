//! MessagePusher trait 定義
//!
//! クライアントへのメッセージ送信（通知）のインターフェース。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// Outbound channel of one connection; the UI layer drains it into the socket.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Per-recipient outcome of a broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    /// Recipients that were unknown or whose channel was closed.
    pub skipped: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register the outbound channel of a new connection
    async fn register_client(&self, client_id: ConnectionId, sender: PusherChannel);

    async fn unregister_client(&self, client_id: &ConnectionId);

    /// Push to a single connection
    async fn push_to(&self, client_id: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// Push to every target, best-effort.
    ///
    /// Unreachable targets are skipped and counted; a broadcast never fails
    /// as a whole.
    async fn broadcast(&self, targets: &[ConnectionId], content: &str) -> DeliveryReport;

    /// Number of registered connections
    async fn client_count(&self) -> usize;
}
