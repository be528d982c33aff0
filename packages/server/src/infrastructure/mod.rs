//! Infrastructure layer
//!
//! ドメイン層の trait（`RoomRepository`, `ConnectionRegistry`, `MessagePusher`）の具体的な実装と、
//! ワイヤーフォーマット（DTO）を提供します。

pub mod dto;
pub mod message_pusher;
pub mod registry;
pub mod repository;
