//! WebSocket message DTOs.
//!
//! Every frame is a JSON envelope `{"kind": ..., "payload": {...}}`.
//! Inbound payloads are parsed leniently (every field optional) and then
//! validated into a [`ClientMessage`]; outbound events are [`ServerMessage`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ChatText, DisplayName, QuestionDraft, QuizStatus, RoomCode};

/// Wire envelope shared by both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default, alias = "data")]
    pub payload: Value,
}

// ========================================
// Inbound payloads
// ========================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    #[serde(alias = "username")]
    pub display_name: Option<String>,
}

/// Payload of `join-room` and `get-room-data`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMembershipPayload {
    pub room_code: Option<String>,
    #[serde(alias = "username")]
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendChatPayload {
    pub room_code: Option<String>,
    #[serde(alias = "message")]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizPayload {
    pub room_code: Option<String>,
    pub questions: Option<Vec<QuestionPayload>>,
}

/// Custom question. The bulk import format names its fields
/// `question` / `correct` / `timer`; both spellings are accepted.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    #[serde(alias = "question")]
    pub text: Option<String>,
    pub options: Option<Vec<String>>,
    #[serde(alias = "correct")]
    pub correct_index: Option<i64>,
    #[serde(alias = "timer")]
    pub time_limit_seconds: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerPayload {
    pub room_code: Option<String>,
    #[serde(alias = "answerIndex")]
    pub selected_index: Option<i64>,
    /// 1-based number of the question the client is answering
    pub question_number: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCodePayload {
    pub room_code: Option<String>,
}

/// A validated inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    CreateRoom {
        display_name: DisplayName,
    },
    JoinRoom {
        room_code: RoomCode,
        display_name: DisplayName,
    },
    GetRoomData {
        room_code: RoomCode,
        display_name: Option<DisplayName>,
    },
    SendChat {
        room_code: RoomCode,
        text: ChatText,
    },
    StartQuiz {
        room_code: RoomCode,
        questions: Option<Vec<QuestionDraft>>,
    },
    SubmitAnswer {
        room_code: RoomCode,
        selected_index: i64,
        question_number: Option<usize>,
    },
    GetMyReview {
        room_code: RoomCode,
    },
    Ping,
}

// ========================================
// Outbound events
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummaryDto {
    pub display_name: String,
    pub score: u32,
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub display_name: String,
    pub text: String,
    pub sent_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSnapshotDto {
    pub status: QuizStatus,
    pub current_index: i64,
    pub total_questions: usize,
    /// Set while a question is live, so a reconnecting client can resume its countdown
    pub question_started_at: Option<i64>,
    pub time_limit_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshotDto {
    pub code: String,
    pub host_display_name: String,
    pub players: Vec<PlayerSummaryDto>,
    pub quiz: QuizSnapshotDto,
    pub chat: Vec<ChatMessageDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryDto {
    pub display_name: String,
    pub score: u32,
    pub answered_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalStandingDto {
    pub display_name: String,
    pub score: u32,
    pub correct_answers: usize,
    pub total_answers: usize,
    pub accuracy: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecordDto {
    pub question_index: usize,
    pub question_text: String,
    pub options: Vec<String>,
    pub selected_index: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub elapsed_seconds: f64,
    pub points_earned: u32,
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    Connected {
        identity: String,
    },
    RoomCreated {
        room_code: String,
        is_host: bool,
    },
    RoomJoined {
        room_code: String,
        is_host: bool,
    },
    JoinError {
        message: String,
    },
    PlayerJoined {
        display_name: String,
        players: Vec<PlayerSummaryDto>,
    },
    RoomData {
        room: RoomSnapshotDto,
        is_host: bool,
    },
    NewChat(ChatMessageDto),
    QuizStarted {
        total_questions: usize,
        message: String,
    },
    NewQuestion {
        question_number: usize,
        total_questions: usize,
        text: String,
        options: Vec<String>,
        time_limit_seconds: u32,
        started_at: i64,
    },
    AnswerSubmitted {
        is_correct: bool,
        correct_index: usize,
        correct_text: String,
        points: u32,
        new_score: u32,
        answered_count: usize,
        expected_answerer_count: usize,
    },
    AnswerProgress {
        answered_count: usize,
        expected_answerer_count: usize,
        question_number: usize,
    },
    AllAnswered {
        message: String,
    },
    LeaderboardUpdate {
        leaderboard: Vec<LeaderboardEntryDto>,
    },
    QuizFinished {
        leaderboard: Vec<FinalStandingDto>,
        message: String,
    },
    PlayerReview {
        display_name: String,
        score: u32,
        answers: Vec<AnswerRecordDto>,
        total_correct: usize,
        total_questions: usize,
    },
    Pong {
        timestamp: i64,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    /// Wire name of the event, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::RoomCreated { .. } => "room-created",
            Self::RoomJoined { .. } => "room-joined",
            Self::JoinError { .. } => "join-error",
            Self::PlayerJoined { .. } => "player-joined",
            Self::RoomData { .. } => "room-data",
            Self::NewChat(_) => "new-chat",
            Self::QuizStarted { .. } => "quiz-started",
            Self::NewQuestion { .. } => "new-question",
            Self::AnswerSubmitted { .. } => "answer-submitted",
            Self::AnswerProgress { .. } => "answer-progress",
            Self::AllAnswered { .. } => "all-answered",
            Self::LeaderboardUpdate { .. } => "leaderboard-update",
            Self::QuizFinished { .. } => "quiz-finished",
            Self::PlayerReview { .. } => "player-review",
            Self::Pong { .. } => "pong",
            Self::Error { .. } => "error",
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
