//! Domain entities
//!
//! Room 集約とその構成要素（Player, QuizSession, Question, ChatMessage）。

pub mod chat;
pub mod player;
pub mod question;
pub mod quiz;
pub mod room;

pub use chat::ChatMessage;
pub use player::{AnswerRecord, Player};
pub use question::{Question, QuestionDraft, default_bank};
pub use quiz::{
    Advance, AdvanceToken, AdvanceTrigger, DispatchedQuestion, PendingAdvance, QuizSession,
    QuizStatus,
};
pub use room::{Admission, AdmissionPolicy, AnswerOutcome, Room};
