//! Domain layer
//!
//! ドメインモデルと、ドメイン層が必要とするインターフェース（trait）を定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

pub mod connection_registry;
pub mod entity;
pub mod error;
pub mod factory;
pub mod leaderboard;
pub mod message_pusher;
pub mod repository;
pub mod scoring;
pub mod value_object;

pub use connection_registry::{Binding, ConnectionRegistry};
pub use entity::{
    Admission, AdmissionPolicy, Advance, AdvanceToken, AdvanceTrigger, AnswerOutcome,
    AnswerRecord, ChatMessage, DispatchedQuestion, Player, Question, QuestionDraft, QuizSession,
    QuizStatus, Room,
};
pub use error::{DomainError, MessagePushError, RepositoryError};
pub use factory::{ConnectionIdFactory, RandomRoomCodeGenerator, RoomCodeGenerator};
pub use message_pusher::{DeliveryReport, MessagePusher, PusherChannel};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use repository::{RoomRepository, SharedRoom};
pub use value_object::{ChatText, ConnectionId, DisplayName, RoomCode, Timestamp};
