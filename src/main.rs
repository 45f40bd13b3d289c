use std::{sync::Arc, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cineai_api::{
    config::Config,
    routes::{create_router, AppState},
    services::{
        providers::{ElevenLabsProvider, GeminiProvider, OmdbProvider},
        SettingsStore,
    },
    voice::IntentExtractor,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cineai_api=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let movies = Arc::new(OmdbProvider::new(
        http_client.clone(),
        config.omdb_api_key.clone(),
        config.omdb_api_url.clone(),
    ));
    let generator = Arc::new(GeminiProvider::new(
        http_client.clone(),
        config.gemini_api_key.clone(),
        &config.gemini_api_url,
        &config.gemini_model,
    ));
    let speech = Arc::new(ElevenLabsProvider::new(
        http_client,
        config.elevenlabs_api_url.clone(),
    ));
    let settings = SettingsStore::load(&config.settings_path).await;

    let state = AppState::new(
        movies,
        generator,
        speech,
        settings,
        IntentExtractor::new(config.voice_fallback_search),
    );
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
