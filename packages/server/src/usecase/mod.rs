//! UseCase layer
//!
//! クライアントからの各要求に対応するユースケースと、クイズ進行のタイマーを定義します。
//! ドメイン層の trait にのみ依存し、具体的な実装は UI 層で注入します。

pub mod broadcast;
pub mod connection;
pub mod create_room;
pub mod error;
pub mod join_room;
pub mod progression;
pub mod review;
pub mod send_chat;
pub mod start_quiz;
pub mod status;
pub mod submit_answer;
pub mod sweep;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcast::Broadcaster;
pub use connection::ConnectionUseCase;
pub use create_room::CreateRoomUseCase;
pub use error::SessionError;
pub use join_room::JoinRoomUseCase;
pub use progression::QuizProgression;
pub use review::GetReviewUseCase;
pub use send_chat::SendChatUseCase;
pub use start_quiz::StartQuizUseCase;
pub use status::StatusUseCase;
pub use submit_answer::SubmitAnswerUseCase;
pub use sweep::SweepIdleRoomsUseCase;
