//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket envelope and event DTOs
//! - `http`: HTTP API response DTOs
//! - `conversion`: Domain Model ⇔ DTO conversion

pub mod conversion;
pub mod http;
pub mod websocket;
