use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{dedup_by_id, Movie},
    services::providers::MovieDatabase,
};

/// Titles shown before the user has searched for anything
pub const FEATURED_TITLES: [&str; 6] = [
    "Inception",
    "The Dark Knight",
    "Interstellar",
    "Pulp Fiction",
    "The Matrix",
    "Avatar",
];

/// Keyword search; "not found" is an empty list
pub async fn search_movies(movies: Arc<dyn MovieDatabase>, query: &str) -> AppResult<Vec<Movie>> {
    if query.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }
    movies.search(query.trim()).await
}

/// Resolves titles to full records in parallel
///
/// Every lookup is issued up front and all of them are awaited. Titles that
/// come back absent are dropped; the survivors keep the order of `titles`
/// and a record reached through two titles appears once.
pub async fn resolve_titles(movies: Arc<dyn MovieDatabase>, titles: &[String]) -> Vec<Movie> {
    let mut tasks = Vec::with_capacity(titles.len());

    for title in titles {
        let movies = movies.clone();
        let title = title.clone();
        let task = tokio::spawn(async move { movies.get_by_title(&title).await });
        tasks.push(task);
    }

    let mut results = Vec::new();
    let mut missing = 0usize;

    for task in tasks {
        match task.await {
            Ok(Some(movie)) => results.push(movie),
            Ok(None) => missing += 1,
            Err(e) => {
                tracing::error!(error = %e, "Title lookup task failed");
                missing += 1;
            }
        }
    }

    if missing > 0 {
        tracing::warn!(
            resolved = results.len(),
            missing,
            provider = movies.name(),
            "Some titles could not be resolved"
        );
    }

    dedup_by_id(results)
}

pub async fn featured(movies: Arc<dyn MovieDatabase>) -> Vec<Movie> {
    let titles: Vec<String> = FEATURED_TITLES.iter().map(|t| t.to_string()).collect();
    resolve_titles(movies, &titles).await
}
