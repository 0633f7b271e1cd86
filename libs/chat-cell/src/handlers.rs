use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::extractor::BearerToken;

use crate::models::{ChatCommandRequest, ChatMessage, ChatReply};
use crate::services::chat::ChatService;
use crate::services::history::ChatHistory;

#[derive(Clone)]
pub struct ChatState {
    pub config: Arc<AppConfig>,
    pub history: Arc<ChatHistory>,
}

impl ChatState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            history: Arc::new(ChatHistory::new()),
        }
    }
}

#[axum::debug_handler]
pub async fn send_command(
    State(state): State<ChatState>,
    Extension(token): Extension<BearerToken>,
    Json(request): Json<ChatCommandRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let text = request.mensagem.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Command text must not be empty".to_string()));
    }
    debug!("Handling chat command ({} chars)", text.len());

    let service = ChatService::new(&state.config);
    let reply = service.handle_command(text, token.as_str()).await;

    state.history.record(token.as_str(), &reply.messages).await;

    Ok(Json(reply))
}

#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<ChatState>,
    Extension(token): Extension<BearerToken>,
) -> Json<Vec<ChatMessage>> {
    Json(state.history.messages(token.as_str()).await)
}

#[axum::debug_handler]
pub async fn clear_messages(
    State(state): State<ChatState>,
    Extension(token): Extension<BearerToken>,
) -> StatusCode {
    state.history.clear(token.as_str()).await;
    StatusCode::NO_CONTENT
}
