//! Server state and dependency wiring.

use std::{collections::HashMap, sync::Arc};

use quizroom_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    config::ServerConfig,
    domain::{RandomRoomCodeGenerator, entity::default_bank},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, registry::InMemoryConnectionRegistry,
        repository::InMemoryRoomRepository,
    },
    usecase::{
        Broadcaster, ConnectionUseCase, CreateRoomUseCase, GetReviewUseCase, JoinRoomUseCase,
        QuizProgression, SendChatUseCase, StartQuizUseCase, StatusUseCase, SubmitAnswerUseCase,
        SweepIdleRoomsUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// Broadcaster（プロトコル層のエラー応答にも使う）
    pub broadcaster: Arc<Broadcaster>,
    pub connection_usecase: Arc<ConnectionUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub send_chat_usecase: Arc<SendChatUseCase>,
    pub start_quiz_usecase: Arc<StartQuizUseCase>,
    pub submit_answer_usecase: Arc<SubmitAnswerUseCase>,
    pub review_usecase: Arc<GetReviewUseCase>,
    pub status_usecase: Arc<StatusUseCase>,
    pub sweep_usecase: Arc<SweepIdleRoomsUseCase>,
}

impl AppState {
    /// Build every dependency from `config`.
    pub fn new(config: &ServerConfig, clock: Arc<dyn Clock>) -> Self {
        // Initialize dependencies in order:
        // 1. Repository / Registry
        // 2. MessagePusher
        // 3. Broadcaster / QuizProgression
        // 4. UseCases

        // 1. Create Repository and Registry (in-memory)
        let repository = Arc::new(InMemoryRoomRepository::new(
            Arc::new(RandomRoomCodeGenerator),
            default_bank(),
            config.chat_capacity,
            config.max_rooms,
        ));
        let registry = Arc::new(InMemoryConnectionRegistry::new());

        // 2. Create MessagePusher (WebSocket implementation)
        let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
        let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));

        // 3. Create Broadcaster and the quiz timers
        let broadcaster = Arc::new(Broadcaster::new(message_pusher.clone()));
        let progression = Arc::new(QuizProgression::new(
            repository.clone(),
            broadcaster.clone(),
            clock.clone(),
            config.timing,
        ));

        // 4. Create UseCases
        let connection_usecase = Arc::new(ConnectionUseCase::new(
            repository.clone(),
            registry.clone(),
            message_pusher.clone(),
            broadcaster.clone(),
            clock.clone(),
        ));
        let create_room_usecase = Arc::new(CreateRoomUseCase::new(
            repository.clone(),
            registry.clone(),
            broadcaster.clone(),
            clock.clone(),
        ));
        let join_room_usecase = Arc::new(JoinRoomUseCase::new(
            repository.clone(),
            registry.clone(),
            broadcaster.clone(),
            clock.clone(),
            config.max_players,
        ));
        let send_chat_usecase = Arc::new(SendChatUseCase::new(
            repository.clone(),
            registry.clone(),
            broadcaster.clone(),
            clock.clone(),
        ));
        let start_quiz_usecase = Arc::new(StartQuizUseCase::new(
            repository.clone(),
            broadcaster.clone(),
            progression.clone(),
        ));
        let submit_answer_usecase = Arc::new(SubmitAnswerUseCase::new(
            repository.clone(),
            registry.clone(),
            broadcaster.clone(),
            progression,
            clock.clone(),
        ));
        let review_usecase = Arc::new(GetReviewUseCase::new(
            repository.clone(),
            registry.clone(),
            broadcaster.clone(),
        ));
        let status_usecase = Arc::new(StatusUseCase::new(
            repository.clone(),
            registry,
            message_pusher,
            clock.clone(),
        ));
        let sweep_usecase = Arc::new(SweepIdleRoomsUseCase::new(
            repository,
            clock,
            config.idle_room,
        ));

        Self {
            broadcaster,
            connection_usecase,
            create_room_usecase,
            join_room_usecase,
            send_chat_usecase,
            start_quiz_usecase,
            submit_answer_usecase,
            review_usecase,
            status_usecase,
            sweep_usecase,
        }
    }
}
