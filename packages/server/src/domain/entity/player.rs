//! Player entity and per-question answer records.

use crate::domain::{
    error::DomainError,
    value_object::{ConnectionId, DisplayName, Timestamp},
};

/// One scored answer. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub question_text: String,
    pub options: Vec<String>,
    pub selected_index: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    /// Server-measured, rounded to tenths of a second.
    pub elapsed_seconds: f64,
    pub points_earned: u32,
}

/// A participant of one room.
///
/// `display_name` is the stable key; `identity` follows the participant's
/// current connection and changes on every reconnect.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    identity: ConnectionId,
    display_name: DisplayName,
    score: u32,
    answers: Vec<AnswerRecord>,
    connected: bool,
    joined_at: Timestamp,
}

impl Player {
    pub fn new(identity: ConnectionId, display_name: DisplayName, joined_at: Timestamp) -> Self {
        Self {
            identity,
            display_name,
            score: 0,
            answers: Vec::new(),
            connected: true,
            joined_at,
        }
    }

    pub fn identity(&self) -> &ConnectionId {
        &self.identity
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn joined_at(&self) -> Timestamp {
        self.joined_at
    }

    pub fn has_answered(&self, question_index: usize) -> bool {
        self.answers
            .iter()
            .any(|a| a.question_index == question_index)
    }

    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    /// Share of correct answers as a rounded percentage; 0 with no answers.
    pub fn accuracy_percent(&self) -> u32 {
        if self.answers.is_empty() {
            return 0;
        }
        ((self.correct_count() as f64 / self.answers.len() as f64) * 100.0).round() as u32
    }

    /// Point this player at a new connection, returning the previous one.
    pub(crate) fn rebind(&mut self, identity: ConnectionId) -> ConnectionId {
        self.connected = true;
        std::mem::replace(&mut self.identity, identity)
    }

    pub(crate) fn mark_disconnected(&mut self) {
        self.connected = false;
    }

    /// Append an answer record and add its points to the score.
    pub(crate) fn record_answer(&mut self, record: AnswerRecord) -> Result<(), DomainError> {
        if self.has_answered(record.question_index) {
            return Err(DomainError::AlreadyAnswered {
                question_number: record.question_index + 1,
            });
        }
        self.score += record.points_earned;
        self.answers.push(record);
        Ok(())
    }
}
