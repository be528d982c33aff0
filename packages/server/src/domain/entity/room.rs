//! Room aggregate.
//!
//! A room owns its players, chat log and quiz session. All mutation goes
//! through the room's methods so the invariants hold:
//!
//! - display names are unique within a room
//! - players are never removed; a dropped connection only marks them offline
//! - at most one answer per player per question index

use std::collections::VecDeque;

use crate::domain::{
    error::DomainError,
    scoring::{elapsed_seconds, score_answer},
    value_object::{ChatText, ConnectionId, DisplayName, RoomCode, Timestamp},
};

use super::{
    chat::ChatMessage,
    player::{AnswerRecord, Player},
    question::{OPTION_COUNT, Question},
    quiz::{QuizSession, QuizStatus},
};

/// Rules applied when a connection asks to enter a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    /// Maximum number of players, counting disconnected ones.
    pub max_players: usize,
    /// Whether a name currently held by a live connection may be taken over.
    pub rebind_live_names: bool,
}

/// How a connection entered the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// A new player was created.
    Joined,
    /// An existing player was re-bound to the new connection.
    Rejoined { previous: ConnectionId },
}

/// Result of an accepted answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub record: AnswerRecord,
    pub correct_text: String,
    pub new_score: u32,
    pub question_number: usize,
    pub answered_count: usize,
    pub expected_answerer_count: usize,
    pub all_answered: bool,
}

#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    host_identity: ConnectionId,
    host_display_name: DisplayName,
    players: Vec<Player>,
    pub quiz: QuizSession,
    chat_log: VecDeque<ChatMessage>,
    chat_capacity: usize,
    created_at: Timestamp,
    last_activity_at: Timestamp,
}

impl Room {
    /// Create a room with the host as its first player.
    pub fn new(
        code: RoomCode,
        host_identity: ConnectionId,
        host_display_name: DisplayName,
        questions: Vec<Question>,
        chat_capacity: usize,
        created_at: Timestamp,
    ) -> Self {
        let host = Player::new(
            host_identity.clone(),
            host_display_name.clone(),
            created_at,
        );
        Self {
            code,
            host_identity,
            host_display_name,
            players: vec![host],
            quiz: QuizSession::new(questions),
            chat_log: VecDeque::new(),
            chat_capacity,
            created_at,
            last_activity_at: created_at,
        }
    }

    pub fn host_identity(&self) -> &ConnectionId {
        &self.host_identity
    }

    pub fn host_display_name(&self) -> &DisplayName {
        &self.host_display_name
    }

    /// Players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn chat_log(&self) -> impl ExactSizeIterator<Item = &ChatMessage> {
        self.chat_log.iter()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    /// `identity` is the host's connection and still plays the host here.
    ///
    /// A host that moved to another room or switched name keeps
    /// `host_identity` until it rejoins, but loses host rights meanwhile.
    pub fn is_host(&self, identity: &ConnectionId) -> bool {
        &self.host_identity == identity
            && self
                .find_player(&self.host_display_name)
                .is_some_and(|p| p.is_connected() && p.identity() == identity)
    }

    pub fn find_player(&self, display_name: &DisplayName) -> Option<&Player> {
        self.players.iter().find(|p| p.display_name() == display_name)
    }

    pub fn find_player_by_identity(&self, identity: &ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.identity() == identity)
    }

    /// Identities every room-wide event is addressed to.
    ///
    /// Offline players are skipped; their identity may now belong to a
    /// connection playing another name or another room. Each identity
    /// appears once.
    pub fn broadcast_targets(&self) -> Vec<ConnectionId> {
        let mut targets: Vec<ConnectionId> = Vec::new();
        for player in self.players.iter().filter(|p| p.is_connected()) {
            if !targets.contains(player.identity()) {
                targets.push(player.identity().clone());
            }
        }
        targets
    }

    pub fn connected_player_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected()).count()
    }

    /// No player currently holds a live connection.
    pub fn is_empty(&self) -> bool {
        self.connected_player_count() == 0
    }

    /// Empty and untouched for longer than `idle_threshold_millis`.
    pub fn is_idle(&self, now: Timestamp, idle_threshold_millis: i64) -> bool {
        self.is_empty() && now.millis_since(self.last_activity_at) > idle_threshold_millis
    }

    /// Bind `identity` to `display_name`: rejoin when the name exists,
    /// otherwise create a new player.
    pub fn admit(
        &mut self,
        identity: ConnectionId,
        display_name: DisplayName,
        policy: AdmissionPolicy,
        now: Timestamp,
    ) -> Result<Admission, DomainError> {
        if let Some(player) = self
            .players
            .iter_mut()
            .find(|p| p.display_name() == &display_name)
        {
            if player.is_connected()
                && player.identity() != &identity
                && !policy.rebind_live_names
            {
                return Err(DomainError::DisplayNameTaken(display_name.into_string()));
            }
            let previous = player.rebind(identity.clone());
            self.release_identity(&identity, &display_name);
            if display_name == self.host_display_name {
                self.host_identity = identity;
            }
            self.last_activity_at = now;
            return Ok(Admission::Rejoined { previous });
        }

        if self.quiz.status() == QuizStatus::Playing {
            return Err(DomainError::JoinClosed);
        }
        if self.players.len() >= policy.max_players {
            return Err(DomainError::RoomFull {
                capacity: policy.max_players,
            });
        }

        self.release_identity(&identity, &display_name);
        self.players.push(Player::new(identity, display_name, now));
        self.last_activity_at = now;
        Ok(Admission::Joined)
    }

    /// A connection plays one name per room: any other player still bound
    /// to `identity` goes offline.
    fn release_identity(&mut self, identity: &ConnectionId, keep: &DisplayName) {
        for player in self
            .players
            .iter_mut()
            .filter(|p| p.identity() == identity && p.display_name() != keep)
        {
            player.mark_disconnected();
        }
    }

    /// Mark the player bound to `identity` as offline.
    ///
    /// A connection that was already superseded by a rejoin matches nobody,
    /// so a late close of an old socket cannot flag the player offline.
    pub fn mark_disconnected(&mut self, identity: &ConnectionId) -> Option<DisplayName> {
        let mut released = None;
        for player in self
            .players
            .iter_mut()
            .filter(|p| p.identity() == identity && p.is_connected())
        {
            player.mark_disconnected();
            released = Some(player.display_name().clone());
        }
        released
    }

    /// Append a chat message, dropping the oldest beyond capacity.
    pub fn post_chat(
        &mut self,
        display_name: DisplayName,
        text: ChatText,
        now: Timestamp,
    ) -> ChatMessage {
        let message = ChatMessage::new(display_name, text, now);
        self.chat_log.push_back(message.clone());
        while self.chat_log.len() > self.chat_capacity {
            self.chat_log.pop_front();
        }
        self.last_activity_at = now;
        message
    }

    /// Score and record an answer to the current question.
    ///
    /// `question_number` (1-based) lets a client pin the question it meant;
    /// an answer racing a transition is then rejected instead of landing on
    /// the next question.
    pub fn submit_answer(
        &mut self,
        display_name: &DisplayName,
        selected_index: i64,
        question_number: Option<usize>,
        now: Timestamp,
    ) -> Result<AnswerOutcome, DomainError> {
        if self.quiz.status() != QuizStatus::Playing {
            return Err(DomainError::QuizNotInProgress);
        }
        if !self.quiz.is_accepting_answers() {
            return Err(DomainError::QuestionNotOpen);
        }
        let (Some(question), Some(started_at)) = (
            self.quiz.current_question().cloned(),
            self.quiz.question_started_at(),
        ) else {
            return Err(DomainError::QuestionNotOpen);
        };
        let index = self.quiz.current_index() as usize;
        if let Some(number) = question_number.filter(|n| *n != index + 1) {
            return Err(DomainError::QuestionClosed {
                question_number: number,
            });
        }
        if !(0..OPTION_COUNT as i64).contains(&selected_index) {
            return Err(DomainError::InvalidSelection(selected_index));
        }

        let player = self
            .players
            .iter_mut()
            .find(|p| p.display_name() == display_name)
            .ok_or_else(|| DomainError::PlayerNotFound(display_name.to_string()))?;

        let elapsed = elapsed_seconds(started_at, now);
        let selected = selected_index as usize;
        let outcome = score_answer(
            selected,
            question.correct_index(),
            question.time_limit_seconds(),
            elapsed,
        );
        let record = AnswerRecord {
            question_index: index,
            question_text: question.text().to_string(),
            options: question.options().to_vec(),
            selected_index: selected,
            correct_index: question.correct_index(),
            is_correct: outcome.is_correct,
            elapsed_seconds: elapsed,
            points_earned: outcome.points,
        };
        player.record_answer(record.clone())?;
        let new_score = player.score();

        let all_answered = self.quiz.register_answer();

        Ok(AnswerOutcome {
            record,
            correct_text: question.correct_text().to_string(),
            new_score,
            question_number: index + 1,
            answered_count: self.quiz.answered_count(),
            expected_answerer_count: self.quiz.expected_answerer_count(),
            all_answered,
        })
    }
}
