use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::services::providers::TextGenerator;

/// Cap on titles returned from a recommendation prompt
pub const MAX_RECOMMENDATIONS: usize = 6;

pub const FALLBACK_RECOMMENDATIONS: [&str; MAX_RECOMMENDATIONS] = [
    "The Dark Knight",
    "Inception",
    "Pulp Fiction",
    "The Matrix",
    "Interstellar",
    "The Godfather",
];

pub const FALLBACK_RANDOM_RECOMMENDATIONS: [&str; MAX_RECOMMENDATIONS] = [
    "The Dark Knight",
    "Spirited Away",
    "Casablanca",
    "Mad Max: Fury Road",
    "Parasite",
    "The Grand Budapest Hotel",
];

pub const ANALYSIS_EMPTY: &str = "Analysis not available.";
pub const ANALYSIS_UNAVAILABLE: &str = "Unable to analyze this movie at the moment.";
pub const CHAT_EMPTY: &str = "Sorry, I couldn't process that request.";
pub const CHAT_UNAVAILABLE: &str = "Sorry, I encountered an error. Please try again.";
pub const CHAT_GREETING: &str = "Hi! I'm your AI movie assistant. I can help you with movie recommendations, plot explanations, trivia, and general movie discussions. Ask me anything about movies!";

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:\d+[.)]|[-*•])\s*"#).expect("list marker pattern is valid")
});

static TRAILING_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\(\d{4}\)\s*$").expect("trailing year pattern is valid")
});

static CHAT_SEARCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)search for (.+)|find (.+)|about (.+)").expect("chat search pattern is valid")
});

/// A chat reply, plus a search the browser may run on the user's behalf
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub suggested_search: Option<String>,
}

/// Prompt-driven recommendations, analysis and chat
///
/// Every operation has a deterministic fallback, so callers never see an
/// error from the model.
#[derive(Clone)]
pub struct Assistant {
    generator: Arc<dyn TextGenerator>,
}

impl Assistant {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Up to six titles matching free-text preferences
    pub async fn recommend(&self, preferences: &str) -> Vec<String> {
        let prompt = format!(
            "Based on these preferences: \"{}\", recommend 6 popular movies. Return ONLY a JSON array of movie titles, like: [\"Movie 1\", \"Movie 2\", \"Movie 3\", \"Movie 4\", \"Movie 5\", \"Movie 6\"]. No additional text or explanation.",
            preferences
        );
        self.titles_or(&prompt, &FALLBACK_RECOMMENDATIONS).await
    }

    /// Six titles across genres and eras
    pub async fn random_recommendations(&self) -> Vec<String> {
        let prompt = "Recommend 6 diverse, popular movies from different genres and time periods. Return ONLY a JSON array of movie titles, like: [\"Movie 1\", \"Movie 2\", \"Movie 3\", \"Movie 4\", \"Movie 5\", \"Movie 6\"]. No additional text.";
        self.titles_or(prompt, &FALLBACK_RANDOM_RECOMMENDATIONS).await
    }

    pub async fn analyze(&self, title: &str, plot: &str) -> String {
        let prompt = format!(
            "Analyze the movie \"{}\" with this plot: \"{}\". Provide a thoughtful analysis covering themes, cinematography, performances, and overall impact. Keep it engaging and informative, around 200-300 words.",
            title, plot
        );

        match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => ANALYSIS_EMPTY.to_string(),
            Err(e) => {
                tracing::warn!(title = %title, error = %e, "Movie analysis failed");
                ANALYSIS_UNAVAILABLE.to_string()
            }
        }
    }

    pub async fn chat(&self, user_text: &str) -> ChatReply {
        let prompt = format!(
            "You are a helpful AI movie assistant. The user asked: \"{}\". Provide helpful information about movies, recommendations, or general movie knowledge. If the user seems to be looking for a specific movie, you can suggest they search for it. Keep responses conversational and engaging.",
            user_text
        );

        let text = match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => CHAT_EMPTY.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Chat reply failed");
                return ChatReply {
                    text: CHAT_UNAVAILABLE.to_string(),
                    suggested_search: None,
                };
            }
        };

        let suggested_search = suggested_search(user_text, &text);
        ChatReply {
            text,
            suggested_search,
        }
    }

    async fn titles_or(&self, prompt: &str, fallback: &[&str]) -> Vec<String> {
        let parsed = match self.generator.generate(prompt).await {
            Ok(reply) => parse_title_list(&reply),
            Err(e) => {
                tracing::warn!(error = %e, "Recommendation request failed");
                Vec::new()
            }
        };

        if parsed.is_empty() {
            tracing::info!("Using fallback recommendations");
            return fallback.iter().map(|t| t.to_string()).collect();
        }

        parsed
    }
}

/// Reads titles out of a model reply
///
/// A JSON array of strings wins. Otherwise lines that look like list items
/// (numbered, bulleted or quoted) are taken with their markers stripped.
/// Prose yields nothing.
pub fn parse_title_list(reply: &str) -> Vec<String> {
    let body = strip_code_fence(reply);

    if let Ok(titles) = serde_json::from_str::<Vec<String>>(body) {
        return titles
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .take(MAX_RECOMMENDATIONS)
            .collect();
    }

    body.lines()
        .filter_map(list_item)
        .take(MAX_RECOMMENDATIONS)
        .collect()
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn list_item(line: &str) -> Option<String> {
    let line = line.trim();
    let item = if let Some(marker) = LIST_MARKER.find(line) {
        &line[marker.end()..]
    } else if line.starts_with('"') {
        line
    } else {
        return None;
    };

    let item = item.trim().trim_end_matches(',');
    let item = TRAILING_YEAR.replace(item, "");
    let item = item
        .trim_matches(|c: char| matches!(c, '"' | '*' | '_'))
        .trim();

    (!item.is_empty()).then(|| item.to_string())
}

/// When the reply nudges the user to search, the phrase they asked about
fn suggested_search(user_text: &str, reply: &str) -> Option<String> {
    let lowered = reply.to_lowercase();
    if !lowered.contains("search for") && !lowered.contains("look up") {
        return None;
    }

    let captures = CHAT_SEARCH.captures(user_text)?;
    captures
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().trim().to_string())
        .find(|q| !q.is_empty())
}
