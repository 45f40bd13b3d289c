/// OMDb movie database provider
///
/// One GET endpoint, three modes selected by query parameter:
/// `s` keyword search, `i` lookup by IMDb id, `t` lookup by title.
/// A `{"Response":"False"}` body means "nothing matched".
use crate::{
    error::{AppError, AppResult},
    models::{dedup_by_id, Movie},
    services::providers::MovieDatabase,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<Movie>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbProvider {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
        }
    }

    async fn fetch(&self, params: &[(&str, &str)]) -> AppResult<Value> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn lookup(&self, params: &[(&str, &str)]) -> AppResult<Option<Movie>> {
        let body = self.fetch(params).await?;
        parse_detail(body)
    }
}

/// Turns a search body into the result set, empty when nothing matched
fn parse_search(body: Value) -> AppResult<Vec<Movie>> {
    let parsed: SearchResponse = serde_json::from_value(body)
        .map_err(|e| AppError::ExternalApi(format!("Failed to parse OMDb search response: {}", e)))?;

    if parsed.response != "True" {
        tracing::debug!(
            reason = parsed.error.as_deref().unwrap_or("unknown"),
            "OMDb search returned no matches"
        );
        return Ok(Vec::new());
    }

    Ok(dedup_by_id(parsed.search))
}

/// Turns a lookup body into a record, `None` when nothing matched
fn parse_detail(body: Value) -> AppResult<Option<Movie>> {
    if body["Response"] == "False" || body.get("imdbID").is_none() {
        return Ok(None);
    }

    serde_json::from_value(body)
        .map(Some)
        .map_err(|e| AppError::ExternalApi(format!("Failed to parse OMDb movie: {}", e)))
}

#[async_trait::async_trait]
impl MovieDatabase for OmdbProvider {
    async fn search(&self, query: &str) -> AppResult<Vec<Movie>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let body = self.fetch(&[("s", query), ("type", "movie")]).await?;
        let movies = parse_search(body)?;

        tracing::info!(
            query = %query,
            results = movies.len(),
            provider = self.name(),
            "Movie search completed"
        );

        Ok(movies)
    }

    async fn get_by_id(&self, id: &str) -> AppResult<Option<Movie>> {
        let movie = self.lookup(&[("i", id), ("plot", "full")]).await?;
        tracing::debug!(imdb_id = %id, found = movie.is_some(), "Movie lookup by id");
        Ok(movie)
    }

    async fn get_by_title(&self, title: &str) -> Option<Movie> {
        match self.lookup(&[("t", title), ("plot", "full")]).await {
            Ok(movie) => {
                tracing::debug!(title = %title, found = movie.is_some(), "Movie lookup by title");
                movie
            }
            Err(e) => {
                tracing::warn!(title = %title, error = %e, "Movie lookup by title failed");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
