use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{
        assistant::CHAT_GREETING,
        providers::{MovieDatabase, SpeechProvider, TextGenerator},
        Assistant, Conversation, SettingsStore,
    },
    voice::{IntentExtractor, VoiceController},
};

pub mod chat;
pub mod movies;
pub mod recommendations;
pub mod settings;
pub mod voice;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn MovieDatabase>,
    pub assistant: Assistant,
    pub chat: Arc<RwLock<Conversation>>,
    pub settings: Arc<RwLock<SettingsStore>>,
    pub voice: VoiceController,
}

impl AppState {
    pub fn new(
        movies: Arc<dyn MovieDatabase>,
        generator: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechProvider>,
        settings: SettingsStore,
        extractor: IntentExtractor,
    ) -> Self {
        Self {
            voice: VoiceController::new(speech, movies.clone(), extractor),
            movies,
            assistant: Assistant::new(generator),
            chat: Arc::new(RwLock::new(Conversation::with_greeting(CHAT_GREETING))),
            settings: Arc::new(RwLock::new(settings)),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Movies
        .route("/movies/search", get(movies::search))
        .route("/movies/featured", get(movies::featured))
        .route("/movies/by-title", get(movies::by_title))
        .route("/movies/:id", get(movies::get_movie))
        .route("/movies/:id/analysis", get(movies::analysis))
        // Recommendations
        .route("/recommendations", post(recommendations::recommend))
        .route("/recommendations/random", get(recommendations::random))
        // Chat
        .route(
            "/chat",
            get(chat::list).post(chat::send).delete(chat::clear),
        )
        // Voice
        .route(
            "/settings/voice",
            get(settings::get_voice).put(settings::update_voice),
        )
        .route("/voice", get(voice::status))
        .route("/voice/start", post(voice::start))
        .route("/voice/stop", post(voice::stop))
        .route("/voice/mute", post(voice::mute))
        .route("/voice/events", post(voice::push_event))
        .route("/voice/transcript", get(voice::transcript))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
