//! Domain layer errors.

use thiserror::Error;

/// Violations of room / quiz rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid room code '{0}'")]
    InvalidRoomCode(String),

    #[error("Display name must be between 1 and {max} characters")]
    InvalidDisplayName { max: usize },

    #[error("Chat message must be between 1 and {max} characters")]
    InvalidChatText { max: usize },

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid question #{number}: {reason}")]
    InvalidQuestionBatch { number: usize, reason: String },

    #[error("Selected option {0} is out of range")]
    InvalidSelection(i64),

    #[error("Quiz has already started")]
    QuizAlreadyStarted,

    #[error("Quiz is not in progress")]
    QuizNotInProgress,

    #[error("No question is open for answers")]
    QuestionNotOpen,

    #[error("Question {question_number} is already closed")]
    QuestionClosed { question_number: usize },

    #[error("Already answered question {question_number}")]
    AlreadyAnswered { question_number: usize },

    #[error("Display name '{0}' is already taken")]
    DisplayNameTaken(String),

    #[error("Quiz already started, new players cannot join")]
    JoinClosed,

    #[error("Room is full ({capacity} players)")]
    RoomFull { capacity: usize },

    #[error("Player '{0}' not found in room")]
    PlayerNotFound(String),
}

/// Room store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Room limit reached ({0} rooms)")]
    RoomCapacityExceeded(usize),

    #[error("Could not generate a unique room code after {0} attempts")]
    RoomCodeExhausted(usize),
}

/// Message delivery errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
