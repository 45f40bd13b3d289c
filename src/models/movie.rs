use serde::{Deserialize, Serialize};

/// A movie record as returned by OMDb
///
/// Field names follow the provider's casing so the record round-trips to the
/// browser unchanged. Search results only carry the first five fields; detail
/// lookups fill in the rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "Plot", default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(rename = "Director", default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "Actors", default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(rename = "Runtime", default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "Genre", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "imdbRating", default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Released", default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(rename = "Writer", default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    #[serde(rename = "Language", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "Country", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "Awards", default, skip_serializing_if = "Option::is_none")]
    pub awards: Option<String>,
    #[serde(rename = "BoxOffice", default, skip_serializing_if = "Option::is_none")]
    pub box_office: Option<String>,
    #[serde(rename = "Production", default, skip_serializing_if = "Option::is_none")]
    pub production: Option<String>,
    #[serde(rename = "Website", default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Movie {
    /// Creates a summary record with only the search fields set
    pub fn summary(imdb_id: impl Into<String>, title: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            imdb_id: imdb_id.into(),
            title: title.into(),
            year: year.into(),
            kind: "movie".to_string(),
            poster: String::new(),
            plot: None,
            director: None,
            actors: None,
            runtime: None,
            genre: None,
            imdb_rating: None,
            released: None,
            writer: None,
            language: None,
            country: None,
            awards: None,
            box_office: None,
            production: None,
            website: None,
        }
    }

    /// Splits the comma-delimited genre string
    pub fn genres(&self) -> Vec<&str> {
        self.genre
            .as_deref()
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty() && *s != "N/A")
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the plot unless the provider left it blank or "N/A"
    pub fn plot_text(&self) -> Option<&str> {
        self.plot
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != "N/A")
    }
}

/// Drops repeated identifiers, keeping the first occurrence and the original order
pub fn dedup_by_id(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen = std::collections::HashSet::new();
    movies
        .into_iter()
        .filter(|m| seen.insert(m.imdb_id.clone()))
        .collect()
}
