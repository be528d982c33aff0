//! Conversion logic between DTOs and domain entities.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use quizroom_shared::time::timestamp_to_rfc3339;

use crate::{
    domain::{
        AnswerRecord, ChatMessage, ChatText, DisplayName, DomainError, Player, QuestionDraft,
        Room, RoomCode,
        leaderboard::{FinalStanding, LeaderboardEntry},
    },
    infrastructure::dto::{http as http_dto, websocket as dto},
};

/// Inbound frame that could not be turned into a [`dto::ClientMessage`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Unknown message kind '{0}'")]
    UnknownKind(String),

    #[error("Missing field '{field}' in {kind}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

// ========================================
// DTO → Domain Model
// ========================================

impl TryFrom<dto::Envelope> for dto::ClientMessage {
    type Error = DecodeError;

    fn try_from(envelope: dto::Envelope) -> Result<Self, Self::Error> {
        let payload = envelope.payload;
        match envelope.kind.as_str() {
            "create-room" => {
                let p: dto::CreateRoomPayload = parse(payload)?;
                Ok(Self::CreateRoom {
                    display_name: display_name("create-room", p.display_name)?,
                })
            }
            "join-room" => {
                let p: dto::RoomMembershipPayload = parse(payload)?;
                Ok(Self::JoinRoom {
                    room_code: room_code("join-room", p.room_code)?,
                    display_name: display_name("join-room", p.display_name)?,
                })
            }
            "get-room-data" => {
                // Older clients send the bare room code as the payload.
                let p: dto::RoomMembershipPayload = match payload {
                    Value::String(code) => dto::RoomMembershipPayload {
                        room_code: Some(code),
                        display_name: None,
                    },
                    other => parse(other)?,
                };
                Ok(Self::GetRoomData {
                    room_code: room_code("get-room-data", p.room_code)?,
                    display_name: p.display_name.map(DisplayName::new).transpose()?,
                })
            }
            "send-chat" => {
                let p: dto::SendChatPayload = parse(payload)?;
                let text = p.text.ok_or(DecodeError::MissingField {
                    kind: "send-chat",
                    field: "text",
                })?;
                Ok(Self::SendChat {
                    room_code: room_code("send-chat", p.room_code)?,
                    text: ChatText::new(text)?,
                })
            }
            "start-quiz" => {
                let p: dto::StartQuizPayload = parse(payload)?;
                Ok(Self::StartQuiz {
                    room_code: room_code("start-quiz", p.room_code)?,
                    questions: p
                        .questions
                        .map(|qs| qs.into_iter().map(QuestionDraft::from).collect()),
                })
            }
            "submit-answer" => {
                let p: dto::SubmitAnswerPayload = parse(payload)?;
                Ok(Self::SubmitAnswer {
                    room_code: room_code("submit-answer", p.room_code)?,
                    selected_index: p.selected_index.ok_or(DecodeError::MissingField {
                        kind: "submit-answer",
                        field: "selectedIndex",
                    })?,
                    question_number: p.question_number,
                })
            }
            "get-my-review" => {
                let p: dto::RoomCodePayload = parse(payload)?;
                Ok(Self::GetMyReview {
                    room_code: room_code("get-my-review", p.room_code)?,
                })
            }
            "ping" => Ok(Self::Ping),
            other => Err(DecodeError::UnknownKind(other.to_string())),
        }
    }
}

/// Missing fields inside a question are left for batch validation to report.
impl From<dto::QuestionPayload> for QuestionDraft {
    fn from(payload: dto::QuestionPayload) -> Self {
        Self {
            text: payload.text.unwrap_or_default(),
            options: payload.options.unwrap_or_default(),
            correct_index: payload.correct_index.unwrap_or(-1),
            time_limit_seconds: payload.time_limit_seconds.unwrap_or(0),
        }
    }
}

fn parse<T: DeserializeOwned + Default>(payload: Value) -> Result<T, DecodeError> {
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload).map_err(|e| DecodeError::Malformed(e.to_string()))
}

fn room_code(kind: &'static str, value: Option<String>) -> Result<RoomCode, DecodeError> {
    let value = value.ok_or(DecodeError::MissingField {
        kind,
        field: "roomCode",
    })?;
    Ok(RoomCode::new(value)?)
}

fn display_name(kind: &'static str, value: Option<String>) -> Result<DisplayName, DecodeError> {
    let value = value.ok_or(DecodeError::MissingField {
        kind,
        field: "displayName",
    })?;
    Ok(DisplayName::new(value)?)
}

// ========================================
// Domain Model → DTO
// ========================================

impl From<&Player> for dto::PlayerSummaryDto {
    fn from(player: &Player) -> Self {
        Self {
            display_name: player.display_name().to_string(),
            score: player.score(),
            connected: player.is_connected(),
        }
    }
}

impl From<&ChatMessage> for dto::ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            display_name: message.display_name.to_string(),
            text: message.text.as_str().to_string(),
            sent_at: message.sent_at.value(),
        }
    }
}

impl From<&AnswerRecord> for dto::AnswerRecordDto {
    fn from(record: &AnswerRecord) -> Self {
        Self {
            question_index: record.question_index,
            question_text: record.question_text.clone(),
            options: record.options.clone(),
            selected_index: record.selected_index,
            correct_index: record.correct_index,
            is_correct: record.is_correct,
            elapsed_seconds: record.elapsed_seconds,
            points_earned: record.points_earned,
        }
    }
}

impl From<LeaderboardEntry> for dto::LeaderboardEntryDto {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            display_name: entry.display_name,
            score: entry.score,
            answered_count: entry.answered_count,
        }
    }
}

impl From<FinalStanding> for dto::FinalStandingDto {
    fn from(standing: FinalStanding) -> Self {
        Self {
            display_name: standing.display_name,
            score: standing.score,
            correct_answers: standing.correct_answers,
            total_answers: standing.total_answers,
            accuracy: standing.accuracy,
        }
    }
}

impl From<&Room> for dto::RoomSnapshotDto {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.to_string(),
            host_display_name: room.host_display_name().to_string(),
            players: room.players().iter().map(Into::into).collect(),
            quiz: dto::QuizSnapshotDto {
                status: room.quiz.status(),
                current_index: room.quiz.current_index(),
                total_questions: room.quiz.total_questions(),
                question_started_at: room.quiz.question_started_at().map(|t| t.value()),
                time_limit_seconds: room.quiz.current_question().map(|q| q.time_limit_seconds()),
            },
            chat: room.chat_log().map(Into::into).collect(),
        }
    }
}

impl From<&Room> for http_dto::RoomInfoDto {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.to_string(),
            total_players: room.players().len(),
            players: room
                .players()
                .iter()
                .map(|p| p.display_name().to_string())
                .collect(),
            status: room.quiz.status(),
            current_index: room.quiz.current_index(),
            question_started_at: room.quiz.question_started_at().map(|t| t.value()),
            time_limit_seconds: room.quiz.current_question().map(|q| q.time_limit_seconds()),
            created_at: timestamp_to_rfc3339(room.created_at().value()),
        }
    }
}
