//! Real-time multiplayer quiz server library.
//!
//! Players gather in short-code rooms over WebSocket, the host starts a timed
//! quiz, and the server scores answers against its own clock and pushes every
//! state change to the room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
