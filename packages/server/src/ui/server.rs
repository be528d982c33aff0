//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::{
    handler::{get_room_info, get_status, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket quiz server
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::default();
/// let state = Arc::new(AppState::new(&config, Arc::new(SystemClock)));
/// Server::new(state, config).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl Server {
    pub fn new(state: Arc<AppState>, config: ServerConfig) -> Self {
        Self { state, config }
    }

    /// Routes of the quiz server
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/status", get(get_status))
            .route("/api/rooms/{code}", get(get_room_info))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the WebSocket quiz server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Quiz server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.run_with_listener(listener).await?;
        Ok(())
    }

    /// Serve on an already bound listener until a shutdown signal arrives.
    pub async fn run_with_listener(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        let sweeper = self.spawn_idle_sweeper();

        // Set up graceful shutdown signal handler
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        sweeper.abort();
        tracing::info!("Server shutdown complete");
        result
    }

    /// Periodically evict rooms nobody is connected to.
    fn spawn_idle_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let sweep = self.state.sweep_usecase.clone();
        let period = self.config.sweep_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                sweep.execute().await;
            }
        })
    }
}
