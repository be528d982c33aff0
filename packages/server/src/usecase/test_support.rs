//! UseCase テスト用の共通セットアップ
//!
//! 実際のインメモリ実装を組み合わせ、各接続の送信キューを受信側から覗けるようにする。

use std::{collections::HashMap, sync::Arc};

use quizroom_shared::time::ManualClock;
use tokio::sync::{Mutex, mpsc};

use crate::{
    config::QuizTiming,
    domain::{
        Binding, ConnectionId, ConnectionRegistry, DisplayName, MessagePusher,
        RandomRoomCodeGenerator, RoomRepository, SharedRoom, Timestamp, entity::default_bank,
    },
    infrastructure::{
        dto::websocket::ServerMessage, message_pusher::WebSocketMessagePusher,
        registry::InMemoryConnectionRegistry, repository::InMemoryRoomRepository,
    },
};

use super::{broadcast::Broadcaster, progression::QuizProgression};

pub(crate) struct Harness {
    pub repository: Arc<InMemoryRoomRepository>,
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub broadcaster: Arc<Broadcaster>,
    pub progression: Arc<QuizProgression>,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_max_rooms(1000)
    }

    pub fn with_max_rooms(max_rooms: usize) -> Self {
        let clock = ManualClock::new(0);
        let repository = Arc::new(InMemoryRoomRepository::new(
            Arc::new(RandomRoomCodeGenerator),
            default_bank(),
            200,
            max_rooms,
        ));
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        let broadcaster = Arc::new(Broadcaster::new(pusher.clone()));
        let progression = Arc::new(QuizProgression::new(
            repository.clone(),
            broadcaster.clone(),
            Arc::new(clock.clone()),
            QuizTiming::default(),
        ));
        Self {
            repository,
            registry,
            pusher,
            broadcaster,
            progression,
            clock,
        }
    }

    /// Register `client_<n>_0` with the pusher and hand back its queue.
    pub async fn connect(&self, n: u32) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let id = ConnectionId::new(format!("client_{n}_0"));
        let (tx, rx) = mpsc::unbounded_channel();
        self.pusher.register_client(id.clone(), tx).await;
        (id, rx)
    }

    /// Create a room hosted by `host` and bind the host in the registry.
    pub async fn room_with_host(&self, host: &ConnectionId, name: &str) -> SharedRoom {
        let name = DisplayName::new(name.to_string()).unwrap();
        let room = self
            .repository
            .create_room(host.clone(), name.clone(), Timestamp::new(0))
            .await
            .unwrap();
        let code = room.lock().await.code.clone();
        self.registry.bind(host.clone(), Binding::new(code, name)).await;
        room
    }
}

/// Drain and decode everything queued for one connection.
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(content) = rx.try_recv() {
        messages.push(serde_json::from_str(&content).unwrap());
    }
    messages
}

pub(crate) fn kinds(messages: &[ServerMessage]) -> Vec<&'static str> {
    messages.iter().map(ServerMessage::kind).collect()
}
