use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
    routes::AppState,
    services::movies::resolve_titles,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub preferences: String,
}

/// Suggested titles and the ones that resolved to full records
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub titles: Vec<String>,
    pub movies: Vec<Movie>,
}

/// Handler for preference-based recommendations
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let preferences = request.preferences.trim();
    if preferences.is_empty() {
        return Err(AppError::InvalidInput(
            "Preferences cannot be empty".to_string(),
        ));
    }

    let titles = state.assistant.recommend(preferences).await;
    let movies = resolve_titles(state.movies.clone(), &titles).await;

    tracing::info!(
        suggested = titles.len(),
        resolved = movies.len(),
        "Recommendations resolved"
    );

    Ok(Json(RecommendationResponse { titles, movies }))
}

pub async fn random(State(state): State<AppState>) -> Json<RecommendationResponse> {
    let titles = state.assistant.random_recommendations().await;
    let movies = resolve_titles(state.movies.clone(), &titles).await;
    Json(RecommendationResponse { titles, movies })
}
