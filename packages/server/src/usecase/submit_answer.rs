//! UseCase: 回答の受付と採点
//!
//! 経過時間はサーバーが問題を配信した時刻から測る。クライアントの申告時刻は使わない。
//!
//! ## テスト作業記録
//!
//! ### 何をテストしているか
//! - 回答者には answer-submitted、ルーム全員には answer-progress と leaderboard-update
//! - 全員が回答すると all-answered が配信され、猶予後に次の問題へ進む
//! - 二重回答、範囲外の選択肢、受付前の回答は拒否されスコアは変わらない

use std::sync::Arc;

use quizroom_shared::time::Clock;

use crate::{
    domain::{ConnectionId, ConnectionRegistry, RoomCode, RoomRepository, Timestamp},
    infrastructure::dto::websocket::ServerMessage,
};

use super::{
    broadcast::Broadcaster, error::SessionError, join_room::sender_name,
    progression::QuizProgression,
};

pub struct SubmitAnswerUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
    progression: Arc<QuizProgression>,
    clock: Arc<dyn Clock>,
}

impl SubmitAnswerUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        broadcaster: Arc<Broadcaster>,
        progression: Arc<QuizProgression>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            broadcaster,
            progression,
            clock,
        }
    }

    /// 現在の問題への回答を採点して記録する
    ///
    /// # Arguments
    ///
    /// * `selected_index` - 選択肢の番号（0 始まり）
    /// * `question_number` - クライアントが回答したつもりの問題番号（1 始まり、任意）
    pub async fn execute(
        &self,
        identity: &ConnectionId,
        room_code: &RoomCode,
        selected_index: i64,
        question_number: Option<usize>,
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
        let outcome = room.submit_answer(&display_name, selected_index, question_number, now)?;
        tracing::info!(
            "Room {}: {} answered question {} ({}, +{} pts, {:.1}s)",
            room.code,
            display_name,
            outcome.question_number,
            if outcome.record.is_correct {
                "correct"
            } else {
                "wrong"
            },
            outcome.record.points_earned,
            outcome.record.elapsed_seconds
        );

        let reply = ServerMessage::AnswerSubmitted {
            is_correct: outcome.record.is_correct,
            correct_index: outcome.record.correct_index,
            correct_text: outcome.correct_text.clone(),
            points: outcome.record.points_earned,
            new_score: outcome.new_score,
            answered_count: outcome.answered_count,
            expected_answerer_count: outcome.expected_answerer_count,
        };
        self.broadcaster.send_to(identity, &reply).await;

        let progress = ServerMessage::AnswerProgress {
            answered_count: outcome.answered_count,
            expected_answerer_count: outcome.expected_answerer_count,
            question_number: outcome.question_number,
        };
        self.broadcaster.to_room(&room, &progress).await;

        if outcome.all_answered {
            self.progression.on_all_answered(&mut room).await;
        }
        self.progression.broadcast_leaderboard(&room).await;
        Ok(())
    }
}
