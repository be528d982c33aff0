//! UseCase: チャット送信

use std::sync::Arc;

use quizroom_shared::time::Clock;

use crate::{
    domain::{ChatText, ConnectionId, ConnectionRegistry, RoomCode, RoomRepository, Timestamp},
    infrastructure::dto::websocket::ServerMessage,
};

use super::{broadcast::Broadcaster, error::SessionError, join_room::sender_name};

pub struct SendChatUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl SendChatUseCase {
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

    /// チャットを記録し、ルーム全員に `new-chat` を配信する
    ///
    /// 送信者名はクライアントの申告ではなく、この接続のバインディングから決める。
    pub async fn execute(
        &self,
        identity: &ConnectionId,
        room_code: &RoomCode,
        text: ChatText,
    ) -> Result<(), SessionError> {
        let binding = self.registry.resolve(identity).await;
        let room = self
            .repository
            .get_room(room_code)
            .await
            .ok_or_else(SessionError::room_not_found)?;
        let mut room = room.lock().await;

        let display_name = sender_name(binding, &room, identity)?;

        let now = Timestamp::new(self.clock.now_millis());
        let message = room.post_chat(display_name, text, now);
        tracing::debug!("Room {}: chat from {}", room.code, message.display_name);

        self.broadcaster
            .to_room(&room, &ServerMessage::NewChat((&message).into()))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::dto::websocket::ChatMessageDto,
        usecase::test_support::{Harness, drain},
    };

    fn usecase(h: &Harness) -> SendChatUseCase {
        SendChatUseCase::new(
            h.repository.clone(),
            h.registry.clone(),
            h.broadcaster.clone(),
            Arc::new(h.clock.clone()),
        )
    }

    fn text(s: &str) -> ChatText {
        ChatText::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_chat_is_logged_and_broadcast_with_bound_name() {
        // テスト項目: チャットはバインドされた名前で記録され、サーバー時刻付きで配信される
        // given (前提条件):
        let h = Harness::new();
        h.clock.set(5_000);
        let usecase = usecase(&h);
        let (host, mut rx) = h.connect(1).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = room.lock().await.code.clone();

        // when (操作):
        usecase.execute(&host, &code, text("hello")).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            drain(&mut rx),
            vec![ServerMessage::NewChat(ChatMessageDto {
                display_name: "Host".to_string(),
                text: "hello".to_string(),
                sent_at: 5_000,
            })]
        );
        assert_eq!(room.lock().await.chat_log().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_from_outsider_is_rejected() {
        // テスト項目: ルームに属していない接続からのチャットは NotFound になり記録されない
        let h = Harness::new();
        let usecase = usecase(&h);
        let (host, _host_rx) = h.connect(1).await;
        let (outsider, _rx) = h.connect(2).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = room.lock().await.code.clone();

        let result = usecase.execute(&outsider, &code, text("hi")).await;

        assert!(matches!(result, Err(SessionError::NotFound(_))));
        assert_eq!(room.lock().await.chat_log().len(), 0);
    }

    #[tokio::test]
    async fn test_chat_to_unknown_room() {
        // テスト項目: 存在しないルームへのチャットは Room not found
        let h = Harness::new();
        let usecase = usecase(&h);
        let (id, _rx) = h.connect(1).await;
        let code = RoomCode::new("QQQQQQ".to_string()).unwrap();

        assert_eq!(
            usecase.execute(&id, &code, text("hi")).await,
            Err(SessionError::room_not_found())
        );
    }
}
