//! UseCase: ルーム作成

use std::sync::Arc;

use quizroom_shared::time::Clock;

use crate::{
    domain::{
        Binding, ConnectionId, ConnectionRegistry, DisplayName, RoomCode, RoomRepository,
        Timestamp,
    },
    infrastructure::dto::websocket::ServerMessage,
};

use super::{broadcast::Broadcaster, error::SessionError, join_room::release_previous_room};

pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            broadcaster,
            clock,
        }
    }

    /// ルームを作成し、作成者をホストとしてバインドする
    ///
    /// 既に別のルームにいた接続は、そのルームではオフライン扱いになる。
    pub async fn execute(
        &self,
        identity: &ConnectionId,
        display_name: DisplayName,
    ) -> Result<RoomCode, SessionError> {
        let now = Timestamp::new(self.clock.now_millis());
        let room = self
            .repository
            .create_room(identity.clone(), display_name.clone(), now)
            .await?;
        let code = room.lock().await.code.clone();

        let previous = self.registry.resolve(identity).await;
        self.registry
            .bind(identity.clone(), Binding::new(code.clone(), display_name.clone()))
            .await;
        if let Some(previous) = previous {
            release_previous_room(self.repository.as_ref(), identity, &previous.room_code).await;
        }

        tracing::info!("Room {} created by {}", code, display_name);
        let message = ServerMessage::RoomCreated {
            room_code: code.to_string(),
            is_host: true,
        };
        self.broadcaster.send_to(identity, &message).await;
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{Harness, drain};

    fn usecase(h: &Harness) -> CreateRoomUseCase {
        CreateRoomUseCase::new(
            h.repository.clone(),
            h.registry.clone(),
            h.broadcaster.clone(),
            Arc::new(h.clock.clone()),
        )
    }

    fn name(s: &str) -> DisplayName {
        DisplayName::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_room_binds_host_and_replies() {
        // テスト項目: ルームを作成すると作成者がホストとしてバインドされ、room-created が返る
        // given (前提条件):
        let h = Harness::new();
        let usecase = usecase(&h);
        let (host, mut rx) = h.connect(1).await;

        // when (操作):
        let code = usecase.execute(&host, name("Host")).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            h.registry.resolve(&host).await,
            Some(Binding::new(code.clone(), name("Host")))
        );
        let room = h.repository.get_room(&code).await.unwrap();
        assert!(room.lock().await.is_host(&host));
        assert_eq!(
            drain(&mut rx),
            vec![ServerMessage::RoomCreated {
                room_code: code.to_string(),
                is_host: true
            }]
        );
    }

    #[tokio::test]
    async fn test_create_room_over_limit_is_conflict() {
        // テスト項目: ルーム数の上限に達していると Conflict になり、バインドされない
        let h = Harness::with_max_rooms(1);
        let usecase = usecase(&h);
        let (first, _rx1) = h.connect(1).await;
        let (second, _rx2) = h.connect(2).await;
        usecase.execute(&first, name("Ana")).await.unwrap();

        let result = usecase.execute(&second, name("Ben")).await;

        assert!(matches!(result, Err(SessionError::Conflict(_))));
        assert_eq!(h.registry.resolve(&second).await, None);
    }

    #[tokio::test]
    async fn test_creating_another_room_leaves_the_previous_one() {
        // テスト項目: 別のルームを作成すると、前のルームではオフラインになり、ホスト権限もイベントも失う
        let h = Harness::new();
        let usecase = usecase(&h);
        let (host, mut rx) = h.connect(1).await;
        let first = usecase.execute(&host, name("Host")).await.unwrap();

        let second = usecase.execute(&host, name("Host")).await.unwrap();
        drain(&mut rx);

        assert_ne!(first, second);
        let first_room = h.repository.get_room(&first).await.unwrap();
        let first_room = first_room.lock().await;
        assert_eq!(first_room.connected_player_count(), 0);
        assert!(!first_room.is_host(&host));
        h.broadcaster
            .to_room(&first_room, &ServerMessage::Pong { timestamp: 1 })
            .await;
        assert!(drain(&mut rx).is_empty());
        assert_eq!(h.registry.resolve(&host).await.unwrap().room_code, second);
    }
}
