use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::voice::VoiceError;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Voice session error: {0}")]
    Voice(#[from] VoiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Voice(voice) => return voice_error_response(voice),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Settings(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Voice failures carry a user-facing message plus a machine-readable cause
fn voice_error_response(error: VoiceError) -> Response {
    let status = match error {
        VoiceError::PermissionDenied => StatusCode::FORBIDDEN,
        VoiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        VoiceError::MissingAgent => StatusCode::NOT_FOUND,
        VoiceError::NotConnected => StatusCode::CONFLICT,
        VoiceError::Unknown(_) => StatusCode::BAD_GATEWAY,
    };

    let body = Json(json!({
        "error": error.user_message(),
        "cause": error.cause(),
    }));

    (status, body).into_response()
}

pub type AppResult<T> = Result<T, AppError>;
