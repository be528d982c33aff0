//! Server configuration.

use std::time::Duration;

pub const DEFAULT_MAX_PLAYERS: usize = 10;
pub const DEFAULT_MAX_ROOMS: usize = 1000;
pub const DEFAULT_CHAT_CAPACITY: usize = 200;
pub const DEFAULT_IDLE_ROOM_SECS: u64 = 5 * 60;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 10 * 60;

/// Delays that drive quiz progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizTiming {
    /// Between `quiz-started` and the first question
    pub lead_in: Duration,
    /// Added to every question's time limit before it times out
    pub question_buffer: Duration,
    /// Between `all-answered` and the next question
    pub grace: Duration,
}

impl Default for QuizTiming {
    fn default() -> Self {
        Self {
            lead_in: Duration::from_secs(3),
            question_buffer: Duration::from_secs(2),
            grace: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Players per room, counting disconnected ones
    pub max_players: usize,
    pub max_rooms: usize,
    /// Chat messages kept per room
    pub chat_capacity: usize,
    /// An empty room is evicted after this long without activity
    pub idle_room: Duration,
    pub sweep_interval: Duration,
    pub timing: QuizTiming,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            max_rooms: DEFAULT_MAX_ROOMS,
            chat_capacity: DEFAULT_CHAT_CAPACITY,
            idle_room: Duration::from_secs(DEFAULT_IDLE_ROOM_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            timing: QuizTiming::default(),
        }
    }
}
