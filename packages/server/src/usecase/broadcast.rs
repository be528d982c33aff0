//! Broadcast Engine
//!
//! Encodes events and fans them out through the `MessagePusher`.
//! Delivery is best-effort: an unreachable recipient is logged and counted,
//! never retried, and never fails the caller.

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, DeliveryReport, MessagePusher, Room},
    infrastructure::dto::websocket::ServerMessage,
};

pub struct Broadcaster {
    message_pusher: Arc<dyn MessagePusher>,
}

impl Broadcaster {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// Send to one connection. Returns whether the event was enqueued.
    pub async fn send_to(&self, target: &ConnectionId, message: &ServerMessage) -> bool {
        let Some(content) = encode(message) else {
            return false;
        };
        match self.message_pusher.push_to(target, &content).await {
            Ok(()) => {
                tracing::debug!("Sent [{}] to '{}'", message.kind(), target);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to send [{}] to '{}': {}", message.kind(), target, e);
                false
            }
        }
    }

    /// Send to every connected player of `room`.
    pub async fn to_room(&self, room: &Room, message: &ServerMessage) -> DeliveryReport {
        let Some(content) = encode(message) else {
            return DeliveryReport::default();
        };
        let targets = room.broadcast_targets();
        let report = self.message_pusher.broadcast(&targets, &content).await;
        tracing::debug!(
            "Broadcast [{}] to room {}: {} delivered, {} skipped",
            message.kind(),
            room.code,
            report.delivered,
            report.skipped
        );
        report
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    match message.encode() {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::error!("Failed to encode [{}]: {}", message.kind(), e);
            None
        }
    }
}
