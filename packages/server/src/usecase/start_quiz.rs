//! UseCase: クイズ開始（ホストのみ）

use std::sync::Arc;

use crate::{
    domain::{
        ConnectionId, DomainError, Question, QuestionDraft, QuizStatus, RoomCode, RoomRepository,
    },
    infrastructure::dto::websocket::ServerMessage,
};

use super::{broadcast::Broadcaster, error::SessionError, progression::QuizProgression};

pub struct StartQuizUseCase {
    repository: Arc<dyn RoomRepository>,
    broadcaster: Arc<Broadcaster>,
    progression: Arc<QuizProgression>,
}

impl StartQuizUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        broadcaster: Arc<Broadcaster>,
        progression: Arc<QuizProgression>,
    ) -> Self {
        Self {
            repository,
            broadcaster,
            progression,
        }
    }

    /// クイズを開始し、リードイン後に最初の問題を配信するよう予約する
    ///
    /// `questions` が空でなければ、全問検証したうえでルームの問題と差し替える。
    /// 1 問でも不正ならクイズは開始されない。
    pub async fn execute(
        &self,
        identity: &ConnectionId,
        room_code: &RoomCode,
        questions: Option<Vec<QuestionDraft>>,
    ) -> Result<usize, SessionError> {
        let room = self
            .repository
            .get_room(room_code)
            .await
            .ok_or_else(SessionError::room_not_found)?;
        let mut room = room.lock().await;

        if !room.is_host(identity) {
            return Err(SessionError::Authorization(
                "Only the host can start the quiz".to_string(),
            ));
        }
        if room.quiz.status() != QuizStatus::Waiting {
            return Err(DomainError::QuizAlreadyStarted.into());
        }
        let custom = questions
            .filter(|drafts| !drafts.is_empty())
            .map(Question::batch)
            .transpose()?;
        let custom_count = custom.as_ref().map(Vec::len);

        let total = room.quiz.start(custom)?;
        match custom_count {
            Some(n) => tracing::info!("Room {}: quiz started with {} custom questions", room.code, n),
            None => tracing::info!("Room {}: quiz started with {} questions", room.code, total),
        }

        let message = ServerMessage::QuizStarted {
            total_questions: total,
            message: "Get ready! The first question is on its way".to_string(),
        };
        self.broadcaster.to_room(&room, &message).await;
        self.progression.begin(&mut room);
        Ok(total)
    }
}
