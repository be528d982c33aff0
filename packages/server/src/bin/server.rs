//! Real-time multiplayer quiz server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin quizroom-server
//! cargo run --bin quizroom-server -- --host 0.0.0.0 --port 3000 --max-players 20
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use quizroom_server::{
    config::{
        DEFAULT_CHAT_CAPACITY, DEFAULT_IDLE_ROOM_SECS, DEFAULT_MAX_PLAYERS, DEFAULT_MAX_ROOMS,
        DEFAULT_SWEEP_INTERVAL_SECS, QuizTiming, ServerConfig,
    },
    ui::{AppState, Server},
};
use quizroom_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "quizroom-server")]
#[command(about = "Real-time multiplayer quiz server over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Players per room, counting disconnected ones
    #[arg(long, default_value_t = DEFAULT_MAX_PLAYERS)]
    max_players: usize,

    /// Rooms alive at the same time
    #[arg(long, default_value_t = DEFAULT_MAX_ROOMS)]
    max_rooms: usize,

    /// Chat messages kept per room
    #[arg(long, default_value_t = DEFAULT_CHAT_CAPACITY)]
    chat_capacity: usize,

    /// Seconds an empty room may stay idle before eviction
    #[arg(long, default_value_t = DEFAULT_IDLE_ROOM_SECS)]
    idle_room_secs: u64,

    /// Seconds between idle-room sweeps
    #[arg(long, default_value_t = DEFAULT_SWEEP_INTERVAL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    sweep_interval_secs: u64,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            max_players: self.max_players,
            max_rooms: self.max_rooms,
            chat_capacity: self.chat_capacity,
            idle_room: Duration::from_secs(self.idle_room_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
            timing: QuizTiming::default(),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = args.server_config();
    tracing::info!(
        "Limits: {} players/room, {} rooms, {} chat messages/room",
        config.max_players,
        config.max_rooms,
        config.chat_capacity
    );

    // 1. Wire repositories, pusher and use cases
    let state = Arc::new(AppState::new(&config, Arc::new(SystemClock)));

    // 2. Create and run the server
    let server = Server::new(state, config);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
