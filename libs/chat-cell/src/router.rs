use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, ChatState};

pub fn chat_routes(config: Arc<AppConfig>) -> Router {
    chat_routes_with_state(ChatState::new(config))
}

pub fn chat_routes_with_state(state: ChatState) -> Router {
    Router::new()
        .route("/commands", post(handlers::send_command))
        .route("/messages", get(handlers::get_messages).delete(handlers::clear_messages))
        .layer(middleware::from_fn(auth_middleware))
        .with_state(state)
}
