//! Quiz progression
//!
//! Server-owned timers that move a quiz forward: the lead-in before the first
//! question, the per-question timeout, and the grace delay after everyone has
//! answered. Each wait is a spawned sleeper registered in the session's single
//! pending-advance slot; when it wakes it re-locks the room and only acts if
//! its token still owns the slot.

use std::{sync::Arc, time::Duration};

use quizroom_shared::time::Clock;

use crate::{
    config::QuizTiming,
    domain::{
        Advance, AdvanceToken, AdvanceTrigger, Room, RoomCode, RoomRepository, Timestamp,
        leaderboard,
    },
    infrastructure::dto::websocket::ServerMessage,
};

use super::broadcast::Broadcaster;

pub struct QuizProgression {
    repository: Arc<dyn RoomRepository>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
    timing: QuizTiming,
}

impl QuizProgression {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
        timing: QuizTiming,
    ) -> Self {
        Self {
            repository,
            broadcaster,
            clock,
            timing,
        }
    }

    /// Dispatch the first question once the lead-in has elapsed.
    pub fn begin(self: &Arc<Self>, room: &mut Room) {
        self.schedule(room, AdvanceTrigger::LeadIn, self.timing.lead_in);
    }

    /// Announce that everyone answered and replace the question timeout
    /// with the grace delay.
    pub async fn on_all_answered(self: &Arc<Self>, room: &mut Room) {
        tracing::info!(
            "Room {}: all players answered question {}",
            room.code,
            room.quiz.current_index() + 1
        );
        let message = ServerMessage::AllAnswered {
            message: "Everyone has answered! Next question coming up...".to_string(),
        };
        self.broadcaster.to_room(room, &message).await;
        self.schedule(room, AdvanceTrigger::AllAnswered, self.timing.grace);
    }

    pub async fn broadcast_leaderboard(&self, room: &Room) {
        let message = ServerMessage::LeaderboardUpdate {
            leaderboard: leaderboard::rank(room.players())
                .into_iter()
                .map(Into::into)
                .collect(),
        };
        self.broadcaster.to_room(room, &message).await;
    }

    fn schedule(self: &Arc<Self>, room: &mut Room, trigger: AdvanceTrigger, delay: Duration) {
        let token = room.quiz.schedule_advance(trigger);
        let code = room.code.clone();
        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.fire(code, token).await;
        });
        room.quiz.attach_abort_handle(token, task.abort_handle());
        tracing::debug!("Room {}: {:?} scheduled in {:?}", room.code, trigger, delay);
    }

    async fn fire(self: Arc<Self>, code: RoomCode, token: AdvanceToken) {
        let Some(room) = self.repository.get_room(&code).await else {
            tracing::debug!("Room {} is gone, dropping timer", code);
            return;
        };
        let mut room = room.lock().await;
        let Some(trigger) = room.quiz.claim_pending(token) else {
            tracing::debug!("Room {}: stale timer ignored", code);
            return;
        };

        match trigger {
            AdvanceTrigger::LeadIn => self.send_question(&mut room).await,
            AdvanceTrigger::QuestionTimeout | AdvanceTrigger::AllAnswered => {
                self.advance(&mut room).await
            }
        }
    }

    async fn advance(self: &Arc<Self>, room: &mut Room) {
        match room.quiz.advance() {
            Ok(Advance::Next(_)) => self.send_question(room).await,
            Ok(Advance::Finished) => self.announce_finish(room).await,
            Err(e) => tracing::warn!("Room {}: cannot advance: {}", room.code, e),
        }
    }

    /// Stamp the current question, arm its timeout and broadcast it.
    async fn send_question(self: &Arc<Self>, room: &mut Room) {
        let now = Timestamp::new(self.clock.now_millis());
        let player_count = room.players().len();
        let dispatched = match room.quiz.dispatch_current(player_count, now) {
            Ok(dispatched) => dispatched,
            Err(e) => {
                tracing::warn!("Room {}: cannot dispatch question: {}", room.code, e);
                return;
            }
        };

        let time_limit = dispatched.question.time_limit_seconds();
        let timeout = Duration::from_secs(u64::from(time_limit)) + self.timing.question_buffer;
        self.schedule(room, AdvanceTrigger::QuestionTimeout, timeout);

        tracing::info!(
            "Room {}: question {}/{} sent to {} players",
            room.code,
            dispatched.index + 1,
            dispatched.total,
            dispatched.expected_answerer_count
        );
        let message = ServerMessage::NewQuestion {
            question_number: dispatched.index + 1,
            total_questions: dispatched.total,
            text: dispatched.question.text().to_string(),
            options: dispatched.question.options().to_vec(),
            time_limit_seconds: time_limit,
            started_at: dispatched.started_at.value(),
        };
        self.broadcaster.to_room(room, &message).await;
    }

    async fn announce_finish(&self, room: &Room) {
        let standings = leaderboard::final_standings(room.players());
        match standings.first() {
            Some(winner) => tracing::info!(
                "Room {}: quiz finished, winner {} ({} pts)",
                room.code,
                winner.display_name,
                winner.score
            ),
            None => tracing::info!("Room {}: quiz finished", room.code),
        }
        let message = ServerMessage::QuizFinished {
            leaderboard: standings.into_iter().map(Into::into).collect(),
            message: "Quiz finished! Thanks for playing".to_string(),
        };
        self.broadcaster.to_room(room, &message).await;
    }
}
