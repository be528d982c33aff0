//! UseCase: 自分の回答履歴の取得

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, ConnectionRegistry, RoomCode, RoomRepository},
    infrastructure::dto::websocket::ServerMessage,
};

use super::{broadcast::Broadcaster, error::SessionError, join_room::sender_name};

pub struct GetReviewUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
}

impl GetReviewUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            repository,
            registry,
            broadcaster,
        }
    }

    /// 回答履歴を `player-review` として本人にだけ返す
    pub async fn execute(
        &self,
        identity: &ConnectionId,
        room_code: &RoomCode,
    ) -> Result<(), SessionError> {
        let binding = self.registry.resolve(identity).await;
        let room = self
            .repository
            .get_room(room_code)
            .await
            .ok_or_else(SessionError::room_not_found)?;
        let room = room.lock().await;

        let display_name = sender_name(binding, &room, identity)?;
        let player = room
            .find_player(&display_name)
            .ok_or_else(|| SessionError::NotFound(format!("Player '{display_name}' not found")))?;

        let message = ServerMessage::PlayerReview {
            display_name: display_name.to_string(),
            score: player.score(),
            answers: player.answers().iter().map(Into::into).collect(),
            total_correct: player.correct_count(),
            total_questions: player.answers().len(),
        };
        self.broadcaster.send_to(identity, &message).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, Timestamp},
        usecase::test_support::{Harness, drain},
    };

    fn usecase(h: &Harness) -> GetReviewUseCase {
        GetReviewUseCase::new(
            h.repository.clone(),
            h.registry.clone(),
            h.broadcaster.clone(),
        )
    }

    #[tokio::test]
    async fn test_review_lists_answers_of_the_requester() {
        // テスト項目: 本人の回答履歴と正解数、回答した問題数が返る
        // given (前提条件): 問題 1 に不正解で回答済み
        let h = Harness::new();
        let usecase = usecase(&h);
        let (host, mut rx) = h.connect(1).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = {
            let mut room = room.lock().await;
            room.quiz.start(None).unwrap();
            room.quiz.dispatch_current(1, Timestamp::new(0)).unwrap();
            let name = DisplayName::new("Host".to_string()).unwrap();
            room.submit_answer(&name, 0, None, Timestamp::new(4_000))
                .unwrap();
            room.code.clone()
        };

        // when (操作):
        usecase.execute(&host, &code).await.unwrap();

        // then (期待する結果):
        match &drain(&mut rx)[..] {
            [
                ServerMessage::PlayerReview {
                    display_name,
                    score,
                    answers,
                    total_correct,
                    total_questions,
                },
            ] => {
                assert_eq!(display_name, "Host");
                assert_eq!(*score, 0);
                assert_eq!(answers.len(), 1);
                assert_eq!(answers[0].selected_index, 0);
                assert_eq!(answers[0].correct_index, 2);
                assert!(!answers[0].is_correct);
                assert_eq!(answers[0].elapsed_seconds, 4.0);
                assert_eq!(*total_correct, 0);
                // 出題数ではなく本人が回答した数
                assert_eq!(*total_questions, 1);
            }
            other => panic!("unexpected messages: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_review_for_stranger_is_not_found() {
        // テスト項目: ルームに属していない接続の履歴要求は NotFound
        let h = Harness::new();
        let usecase = usecase(&h);
        let (host, _host_rx) = h.connect(1).await;
        let (stranger, _rx) = h.connect(2).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = room.lock().await.code.clone();

        let result = usecase.execute(&stranger, &code).await;

        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }
}
