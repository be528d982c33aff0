//! UseCase layer errors.
//!
//! Every variant is answered to the requesting connection only.

use thiserror::Error;

use crate::domain::{DomainError, RepositoryError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Malformed or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Host-only action by a non-host
    #[error("{0}")]
    Authorization(String),

    /// Unknown room or unknown player context
    #[error("{0}")]
    NotFound(String),

    /// Request clashes with the current room state
    #[error("{0}")]
    Conflict(String),
}

impl SessionError {
    pub fn room_not_found() -> Self {
        Self::NotFound("Room not found".to_string())
    }
}

impl From<DomainError> for SessionError {
    fn from(error: DomainError) -> Self {
        let message = error.to_string();
        match error {
            // A malformed code cannot name a live room.
            DomainError::InvalidRoomCode(_) => Self::room_not_found(),
            DomainError::InvalidDisplayName { .. }
            | DomainError::InvalidChatText { .. }
            | DomainError::InvalidQuestion(_)
            | DomainError::InvalidQuestionBatch { .. }
            | DomainError::InvalidSelection(_) => Self::Validation(message),
            DomainError::PlayerNotFound(_) => Self::NotFound(message),
            DomainError::QuizAlreadyStarted
            | DomainError::QuizNotInProgress
            | DomainError::QuestionNotOpen
            | DomainError::QuestionClosed { .. }
            | DomainError::AlreadyAnswered { .. }
            | DomainError::DisplayNameTaken(_)
            | DomainError::JoinClosed
            | DomainError::RoomFull { .. } => Self::Conflict(message),
        }
    }
}

impl From<RepositoryError> for SessionError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::RoomNotFound(_) => Self::room_not_found(),
            RepositoryError::RoomCapacityExceeded(_) | RepositoryError::RoomCodeExhausted(_) => {
                Self::Conflict(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_taxonomy() {
        // テスト項目: ドメインエラーが Validation / NotFound / Conflict に分類される
        assert_eq!(
            SessionError::from(DomainError::InvalidRoomCode("x".to_string())),
            SessionError::room_not_found()
        );
        assert!(matches!(
            SessionError::from(DomainError::InvalidSelection(9)),
            SessionError::Validation(_)
        ));
        assert_eq!(
            SessionError::from(DomainError::AlreadyAnswered { question_number: 2 }),
            SessionError::Conflict("Already answered question 2".to_string())
        );
        assert!(matches!(
            SessionError::from(DomainError::PlayerNotFound("Ana".to_string())),
            SessionError::NotFound(_)
        ));
    }

    #[test]
    fn test_repository_errors_map_to_taxonomy() {
        // テスト項目: ストアのエラーが NotFound / Conflict に分類される
        assert_eq!(
            SessionError::from(RepositoryError::RoomNotFound("AB12C3".to_string())),
            SessionError::room_not_found()
        );
        assert!(matches!(
            SessionError::from(RepositoryError::RoomCapacityExceeded(1000)),
            SessionError::Conflict(_)
        ));
    }
}
