//! UseCase: 接続のライフサイクル
//!
//! 接続時に identity を発行して `connected` を返し、切断時にはバインディングを解除して
//! プレイヤーをオフラインにする。プレイヤー自体はルームから削除しない。

use std::sync::Arc;

use quizroom_shared::time::Clock;

use crate::{
    domain::{
        ConnectionId, ConnectionIdFactory, ConnectionRegistry, MessagePusher, PusherChannel,
        RoomRepository,
    },
    infrastructure::dto::websocket::ServerMessage,
};

use super::broadcast::Broadcaster;

pub struct ConnectionUseCase {
    id_factory: ConnectionIdFactory,
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl ConnectionUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            id_factory: ConnectionIdFactory::new(clock.clone()),
            repository,
            registry,
            message_pusher,
            broadcaster,
            clock,
        }
    }

    /// 新しい接続を受け付ける
    ///
    /// identity を発行して送信チャンネルを登録し、`connected` を送る。
    pub async fn connect(&self, sender: PusherChannel) -> ConnectionId {
        let identity = self.id_factory.mint();
        self.message_pusher
            .register_client(identity.clone(), sender)
            .await;
        tracing::info!("Connection '{}' opened", identity);

        let message = ServerMessage::Connected {
            identity: identity.to_string(),
        };
        self.broadcaster.send_to(&identity, &message).await;
        identity
    }

    /// 接続の切断を処理する
    ///
    /// バインドされていたプレイヤーはオフラインになるだけで、スコアと回答は残る。
    pub async fn disconnect(&self, identity: &ConnectionId) {
        self.message_pusher.unregister_client(identity).await;

        let Some(binding) = self.registry.unbind(identity).await else {
            tracing::info!("Connection '{}' closed (no room)", identity);
            return;
        };
        let Some(room) = self.repository.get_room(&binding.room_code).await else {
            tracing::info!(
                "Connection '{}' closed, room {} already gone",
                identity,
                binding.room_code
            );
            return;
        };

        let mut room = room.lock().await;
        match room.mark_disconnected(identity) {
            Some(name) => tracing::info!(
                "{} left room {} ({} still connected)",
                name,
                room.code,
                room.connected_player_count()
            ),
            None => tracing::debug!(
                "Connection '{}' was already superseded in room {}",
                identity,
                room.code
            ),
        }
    }

    /// `ping` への応答
    pub async fn pong(&self, identity: &ConnectionId) {
        let message = ServerMessage::Pong {
            timestamp: self.clock.now_millis(),
        };
        self.broadcaster.send_to(identity, &message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::DisplayName,
        usecase::test_support::{Harness, drain},
    };

    fn usecase(h: &Harness) -> ConnectionUseCase {
        ConnectionUseCase::new(
            h.repository.clone(),
            h.registry.clone(),
            h.pusher.clone(),
            h.broadcaster.clone(),
            Arc::new(h.clock.clone()),
        )
    }

    #[tokio::test]
    async fn test_connect_mints_identity_and_sends_connected() {
        // テスト項目: 接続ごとに一意な identity が発行され、connected が送られる
        // given (前提条件):
        let h = Harness::new();
        h.clock.set(1_700_000_000_000);
        let usecase = usecase(&h);
        let (tx1, mut rx1) = tokio::sync::mpsc::unbounded_channel();
        let (tx2, _rx2) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let first = usecase.connect(tx1).await;
        let second = usecase.connect(tx2).await;

        // then (期待する結果):
        assert_eq!(first.as_str(), "client_1_1700000000000");
        assert_ne!(first, second);
        assert_eq!(h.pusher.client_count().await, 2);
        assert_eq!(
            drain(&mut rx1),
            vec![ServerMessage::Connected {
                identity: "client_1_1700000000000".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_disconnect_marks_player_offline_and_keeps_score() {
        // テスト項目: 切断するとバインディングが外れ、プレイヤーはオフラインになるが残る
        // given (前提条件):
        let h = Harness::new();
        let usecase = usecase(&h);
        let (host, _rx) = h.connect(1).await;
        let room = h.room_with_host(&host, "Host").await;

        // when (操作):
        usecase.disconnect(&host).await;

        // then (期待する結果):
        let room = room.lock().await;
        let player = room
            .find_player(&DisplayName::new("Host".to_string()).unwrap())
            .unwrap();
        assert!(!player.is_connected());
        assert_eq!(room.players().len(), 1);
        assert_eq!(h.registry.resolve(&host).await, None);
        assert_eq!(h.pusher.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_without_room_is_noop() {
        // テスト項目: ルームに入っていない接続の切断は送信先の登録解除だけ
        let h = Harness::new();
        let usecase = usecase(&h);
        let (id, _rx) = h.connect(4).await;

        usecase.disconnect(&id).await;

        assert_eq!(h.pusher.client_count().await, 0);
        assert_eq!(h.repository.count_rooms().await, 0);
    }

    #[tokio::test]
    async fn test_pong_uses_server_clock() {
        // テスト項目: pong にはサーバー時刻が入る
        let h = Harness::new();
        h.clock.set(42);
        let usecase = usecase(&h);
        let (id, mut rx) = h.connect(1).await;

        usecase.pong(&id).await;

        assert_eq!(drain(&mut rx), vec![ServerMessage::Pong { timestamp: 42 }]);
    }
}
