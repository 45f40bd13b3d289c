use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::Message,
    routes::AppState,
    voice::{
        EventOutcome, MicrophonePermission, SessionEvent, SessionStatus, TranscriptEvent,
    },
};

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub microphone: MicrophonePermission,
}

#[derive(Debug, Deserialize)]
pub struct MuteRequest {
    pub muted: bool,
}

#[derive(Debug, Serialize)]
pub struct MuteResponse {
    pub muted: bool,
    pub volume: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlEvent {
    Disconnected,
}

/// Either a `{source, message}` transcript line or a `{type}` control event
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EventRequest {
    Transcript(TranscriptEvent),
    Control {
        #[serde(rename = "type")]
        kind: ControlEvent,
    },
}

impl From<EventRequest> for SessionEvent {
    fn from(request: EventRequest) -> Self {
        match request {
            EventRequest::Transcript(t) => SessionEvent::Transcript(t),
            EventRequest::Control {
                kind: ControlEvent::Disconnected,
            } => SessionEvent::Disconnected,
        }
    }
}

pub async fn status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.voice.status().await)
}

/// Handler for session start, using the stored credentials
pub async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> AppResult<Json<SessionStatus>> {
    let credentials = state.settings.read().await.credentials().clone();
    let status = state.voice.start(&credentials, request.microphone).await?;
    Ok(Json(status))
}

pub async fn stop(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.voice.stop().await)
}

pub async fn mute(
    State(state): State<AppState>,
    Json(request): Json<MuteRequest>,
) -> AppResult<Json<MuteResponse>> {
    let volume = state.voice.set_muted(request.muted).await?;
    Ok(Json(MuteResponse {
        muted: request.muted,
        volume,
    }))
}

/// Handler for events relayed from the browser's speech session
pub async fn push_event(
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> AppResult<Json<EventOutcome>> {
    let outcome = state.voice.push(request.into()).await?;
    Ok(Json(outcome))
}

pub async fn transcript(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.voice.transcript().await)
}
