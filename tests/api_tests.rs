use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use cineai_api::{
    error::{AppError, AppResult},
    models::Movie,
    routes::{create_router, AppState},
    services::{
        providers::{MovieDatabase, SpeechProvider, TextGenerator},
        SettingsStore,
    },
    voice::{IntentExtractor, VoiceError},
};

struct FakeMovies {
    by_title: HashMap<String, Movie>,
}

impl FakeMovies {
    fn new() -> Self {
        let mut plotted = Movie::summary("tt0133093", "The Matrix", "1999");
        plotted.plot = Some("A hacker discovers reality is a simulation.".to_string());
        plotted.genre = Some("Action, Sci-Fi".to_string());

        let movies = vec![
            plotted,
            Movie::summary("tt0468569", "The Dark Knight", "2008"),
            Movie::summary("tt1375666", "Inception", "2010"),
            Movie::summary("tt0110912", "Pulp Fiction", "1994"),
            Movie::summary("tt0816692", "Interstellar", "2014"),
        ];

        Self {
            by_title: movies.into_iter().map(|m| (m.title.clone(), m)).collect(),
        }
    }
}

#[async_trait::async_trait]
impl MovieDatabase for FakeMovies {
    async fn search(&self, query: &str) -> AppResult<Vec<Movie>> {
        if query == "explode" {
            return Err(AppError::ExternalApi("OMDb unavailable".to_string()));
        }
        let query = query.to_lowercase();
        let mut found: Vec<Movie> = self
            .by_title
            .values()
            .filter(|m| m.title.to_lowercase().contains(&query))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(found)
    }

    async fn get_by_id(&self, id: &str) -> AppResult<Option<Movie>> {
        Ok(self.by_title.values().find(|m| m.imdb_id == id).cloned())
    }

    async fn get_by_title(&self, title: &str) -> Option<Movie> {
        self.by_title.get(title).cloned()
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

struct FakeGenerator {
    reply: Option<&'static str>,
}

#[async_trait::async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> AppResult<String> {
        self.reply
            .map(str::to_string)
            .ok_or_else(|| AppError::ExternalApi("model offline".to_string()))
    }
}

struct FakeSpeech;

#[async_trait::async_trait]
impl SpeechProvider for FakeSpeech {
    async fn signed_url(&self, api_key: &str, agent_id: &str) -> Result<String, VoiceError> {
        match (api_key, agent_id) {
            ("sk_bad", _) => Err(VoiceError::Unauthorized),
            (_, "unknown_agent") => Err(VoiceError::MissingAgent),
            _ => Ok(format!("wss://voice.test/{}", agent_id)),
        }
    }
}

async fn create_test_server(reply: Option<&'static str>) -> (TestServer, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsStore::load(dir.path().join("settings.json")).await;

    let state = AppState::new(
        Arc::new(FakeMovies::new()),
        Arc::new(FakeGenerator { reply }),
        Arc::new(FakeSpeech),
        settings,
        IntentExtractor::default(),
    );

    (TestServer::new(create_router(state)).unwrap(), dir)
}

async fn save_credentials(server: &TestServer, api_key: &str, agent_id: &str) {
    server
        .put("/api/v1/settings/voice")
        .json(&json!({ "api_key": api_key, "agent_id": agent_id }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let (server, _dir) = create_test_server(None).await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_search_returns_matches() {
    let (server, _dir) = create_test_server(None).await;

    let response = server
        .get("/api/v1/movies/search")
        .add_query_param("q", "the")
        .await;
    response.assert_status_ok();

    let movies: Vec<Value> = response.json();
    let titles: Vec<_> = movies.iter().map(|m| m["Title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["The Dark Knight", "The Matrix"]);
}

#[tokio::test]
async fn test_search_not_found_is_empty_list() {
    let (server, _dir) = create_test_server(None).await;

    let response = server
        .get("/api/v1/movies/search")
        .add_query_param("q", "zzzz")
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Vec<Value>>().len(), 0);
}

#[tokio::test]
async fn test_search_provider_failure_surfaces() {
    let (server, _dir) = create_test_server(None).await;

    let response = server
        .get("/api/v1/movies/search")
        .add_query_param("q", "explode")
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_movie_detail_and_missing() {
    let (server, _dir) = create_test_server(None).await;

    let response = server.get("/api/v1/movies/tt1375666").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["Title"], "Inception");

    server
        .get("/api/v1/movies/tt0000000")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_featured_skips_unresolved_titles() {
    let (server, _dir) = create_test_server(None).await;

    let response = server.get("/api/v1/movies/featured").await;
    response.assert_status_ok();

    // "Avatar" is not in the fake database
    let movies: Vec<Value> = response.json();
    let titles: Vec<_> = movies.iter().map(|m| m["Title"].as_str().unwrap()).collect();
    assert_eq!(
        titles,
        vec!["Inception", "The Dark Knight", "Interstellar", "Pulp Fiction", "The Matrix"]
    );
}

#[tokio::test]
async fn test_recommendations_fallback_on_prose() {
    let (server, _dir) = create_test_server(Some("not json at all")).await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "preferences": "mind-bending sci-fi" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["titles"].as_array().unwrap().len(), 6);
    assert_eq!(body["titles"][0], "The Dark Knight");
    // The Godfather is absent from the fake database
    assert_eq!(body["movies"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_recommendations_reject_blank_preferences() {
    let (server, _dir) = create_test_server(None).await;
    server
        .post("/api/v1/recommendations")
        .json(&json!({ "preferences": "  " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analysis_passes_model_text() {
    let (server, _dir) = create_test_server(Some("A landmark of cyberpunk cinema.")).await;

    let response = server.get("/api/v1/movies/tt0133093/analysis").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["title"], "The Matrix");
    assert_eq!(body["genres"], json!(["Action", "Sci-Fi"]));
    assert_eq!(body["analysis"], "A landmark of cyberpunk cinema.");
}

#[tokio::test]
async fn test_chat_round_trip_and_clear() {
    let (server, _dir) = create_test_server(None).await;

    let response = server
        .post("/api/v1/chat")
        .json(&json!({ "message": "Who directed Alien?" }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"]["text"],
        "Sorry, I encountered an error. Please try again."
    );

    let messages: Vec<Value> = server.get("/api/v1/chat").await.json();
    let origins: Vec<_> = messages.iter().map(|m| m["origin"].as_str().unwrap()).collect();
    assert_eq!(origins, vec!["assistant", "user", "assistant"]);

    server
        .delete("/api/v1/chat")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let messages: Vec<Value> = server.get("/api/v1/chat").await.json();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_voice_settings_are_masked_and_persisted() {
    let (server, dir) = create_test_server(None).await;
    save_credentials(&server, "sk_secret_9876", "agent_1").await;

    let body: Value = server.get("/api/v1/settings/voice").await.json();
    assert_eq!(body["api_key"], "**********9876");
    assert_eq!(body["agent_id"], "agent_1");

    let reloaded = SettingsStore::load(dir.path().join("settings.json")).await;
    assert_eq!(reloaded.credentials().api_key, "sk_secret_9876");
}

#[tokio::test]
async fn test_voice_start_without_agent() {
    let (server, _dir) = create_test_server(None).await;

    let response = server
        .post("/api/v1/voice/start")
        .json(&json!({ "microphone": "granted" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["cause"], "missing_agent");

    let status: Value = server.get("/api/v1/voice").await.json();
    assert_eq!(status["state"], "disconnected");
    assert_eq!(status["last_error"]["cause"], "missing_agent");
}

#[tokio::test]
async fn test_voice_start_permission_and_auth_failures() {
    let (server, _dir) = create_test_server(None).await;
    save_credentials(&server, "sk_bad", "agent_1").await;

    let denied = server
        .post("/api/v1/voice/start")
        .json(&json!({ "microphone": "denied" }))
        .await;
    denied.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(denied.json::<Value>()["cause"], "permission");

    let unauthorized = server
        .post("/api/v1/voice/start")
        .json(&json!({ "microphone": "granted" }))
        .await;
    unauthorized.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(unauthorized.json::<Value>()["cause"], "authorization");
}

#[tokio::test]
async fn test_voice_session_flow() {
    let (server, _dir) = create_test_server(None).await;
    save_credentials(&server, "sk_good", "agent_1").await;

    let started = server
        .post("/api/v1/voice/start")
        .json(&json!({ "microphone": "granted" }))
        .await;
    started.assert_status_ok();
    let status: Value = started.json();
    assert_eq!(status["state"], "connected");
    assert_eq!(status["muted"], false);
    assert_eq!(status["signed_url"], "wss://voice.test/agent_1");

    let assistant_line: Value = server
        .post("/api/v1/voice/events")
        .json(&json!({ "source": "ai", "message": "I can search for the matrix" }))
        .await
        .json();
    assert_eq!(assistant_line["intent"]["action"], "no_action");

    let outcome: Value = server
        .post("/api/v1/voice/events")
        .json(&json!({ "source": "user", "message": "Search for the Matrix" }))
        .await
        .json();
    assert_eq!(outcome["intent"]["action"], "search");
    assert_eq!(outcome["intent"]["query"], "the matrix");
    assert_eq!(outcome["search"]["results"][0]["imdbID"], "tt0133093");

    let muted: Value = server
        .post("/api/v1/voice/mute")
        .json(&json!({ "muted": true }))
        .await
        .json();
    assert_eq!(muted["volume"], 0.0);

    let transcript: Vec<Value> = server.get("/api/v1/voice/transcript").await.json();
    assert_eq!(transcript.len(), 2);

    server
        .post("/api/v1/voice/events")
        .json(&json!({ "type": "disconnected" }))
        .await
        .assert_status_ok();

    let status: Value = server.get("/api/v1/voice").await.json();
    assert_eq!(status["state"], "disconnected");
    assert_eq!(status["last_search"]["query"], "the matrix");

    server
        .post("/api/v1/voice/events")
        .json(&json!({ "source": "user", "message": "find inception" }))
        .await
        .assert_status(StatusCode::CONFLICT);
}
