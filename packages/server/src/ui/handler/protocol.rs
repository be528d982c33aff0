//! Session protocol handler.
//!
//! テキストフレーム 1 つを検証してユースケースに振り分ける。拒否された要求には送信者に
//! だけエラーイベントを返し、共有状態には触れない。参加系 (`join-room` / `get-room-data`)
//! の失敗は `join-error`、それ以外は `error` で返す。ただし `get-room-data` で
//! ルームが見つからない場合は `error`。

use crate::{
    domain::ConnectionId,
    infrastructure::dto::{
        conversion::DecodeError,
        websocket::{ClientMessage, Envelope, ServerMessage},
    },
    ui::state::AppState,
    usecase::SessionError,
};

/// Handle one inbound text frame from `identity`.
pub async fn handle_text_message(state: &AppState, identity: &ConnectionId, text: &str) {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            let error = rejection(DecodeError::Malformed(e.to_string()));
            reply_error(state, identity, "", &error).await;
            return;
        }
    };
    let kind = envelope.kind.clone();
    tracing::debug!("Received [{}] from '{}'", kind, identity);

    let result = match ClientMessage::try_from(envelope) {
        Ok(message) => dispatch(state, identity, message).await,
        Err(e) => Err(rejection(e)),
    };
    if let Err(error) = result {
        reply_error(state, identity, &kind, &error).await;
    }
}

async fn dispatch(
    state: &AppState,
    identity: &ConnectionId,
    message: ClientMessage,
) -> Result<(), SessionError> {
    match message {
        ClientMessage::CreateRoom { display_name } => state
            .create_room_usecase
            .execute(identity, display_name)
            .await
            .map(|_| ()),
        ClientMessage::JoinRoom {
            room_code,
            display_name,
        } => {
            state
                .join_room_usecase
                .join(identity, &room_code, display_name)
                .await
        }
        ClientMessage::GetRoomData {
            room_code,
            display_name,
        } => {
            state
                .join_room_usecase
                .get_room_data(identity, &room_code, display_name)
                .await
        }
        ClientMessage::SendChat { room_code, text } => {
            state
                .send_chat_usecase
                .execute(identity, &room_code, text)
                .await
        }
        ClientMessage::StartQuiz {
            room_code,
            questions,
        } => state
            .start_quiz_usecase
            .execute(identity, &room_code, questions)
            .await
            .map(|_| ()),
        ClientMessage::SubmitAnswer {
            room_code,
            selected_index,
            question_number,
        } => {
            state
                .submit_answer_usecase
                .execute(identity, &room_code, selected_index, question_number)
                .await
        }
        ClientMessage::GetMyReview { room_code } => {
            state.review_usecase.execute(identity, &room_code).await
        }
        ClientMessage::Ping => {
            state.connection_usecase.pong(identity).await;
            Ok(())
        }
    }
}

fn rejection(error: DecodeError) -> SessionError {
    match error {
        DecodeError::Invalid(e) => e.into(),
        other => SessionError::Validation(other.to_string()),
    }
}

async fn reply_error(state: &AppState, identity: &ConnectionId, kind: &str, error: &SessionError) {
    tracing::warn!("Rejected [{}] from '{}': {}", kind, identity, error);
    let message = error.to_string();
    let reply = match (kind, error) {
        // An unknown room on get-room-data is a plain error, not a refused join
        ("get-room-data", SessionError::NotFound(_)) => ServerMessage::Error { message },
        ("join-room" | "get-room-data", _) => ServerMessage::JoinError { message },
        _ => ServerMessage::Error { message },
    };
    state.broadcaster.send_to(identity, &reply).await;
}
