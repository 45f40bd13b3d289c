use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{Message, Origin},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: Message,
    pub suggested_search: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.chat.read().await.messages().to_vec())
}

/// Handler for a chat turn: log the user line, ask the model, log the reply
pub async fn send(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let text = request.message.trim();
    if text.is_empty() {
        return Err(AppError::InvalidInput("Message cannot be empty".to_string()));
    }

    state.chat.write().await.push(Origin::User, text);

    let reply = state.assistant.chat(text).await;
    let message = state.chat.write().await.push(Origin::Assistant, reply.text);

    Ok(Json(ChatResponse {
        message,
        suggested_search: reply.suggested_search,
    }))
}

pub async fn clear(State(state): State<AppState>) -> StatusCode {
    state.chat.write().await.clear();
    StatusCode::NO_CONTENT
}
