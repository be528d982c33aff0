//! Request handlers.

mod http;
mod protocol;
mod websocket;

pub use http::{get_room_info, get_status, health_check};
pub use websocket::websocket_handler;
