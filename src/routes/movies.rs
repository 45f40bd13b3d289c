use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::Movie,
    routes::AppState,
    services::movies as movie_service,
};

const NO_PLOT: &str = "No plot summary is available.";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    title: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub imdb_id: String,
    pub title: String,
    pub genres: Vec<String>,
    pub analysis: String,
}

/// Handler for movie search; no matches is an empty list
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    tracing::info!(request_id = %request_id, query = %params.q, "Processing movie search");
    let movies = movie_service::search_movies(state.movies.clone(), &params.q).await?;
    Ok(Json(movies))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Movie>> {
    state
        .movies
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No movie with id {}", id)))
}

pub async fn by_title(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> AppResult<Json<Movie>> {
    if params.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }

    state
        .movies
        .get_by_title(params.title.trim())
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No movie titled {}", params.title)))
}

pub async fn featured(State(state): State<AppState>) -> Json<Vec<Movie>> {
    Json(movie_service::featured(state.movies.clone()).await)
}

/// Handler for the AI analysis of a single movie
pub async fn analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AnalysisResponse>> {
    let movie = state
        .movies
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No movie with id {}", id)))?;

    let plot = movie.plot_text().unwrap_or(NO_PLOT);
    let analysis = state.assistant.analyze(&movie.title, plot).await;

    let genres = movie.genres().into_iter().map(str::to_string).collect();

    Ok(Json(AnalysisResponse {
        imdb_id: movie.imdb_id,
        title: movie.title,
        genres,
        analysis,
    }))
}
