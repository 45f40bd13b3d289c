/// External collaborators: movie database, generative text model, speech provider
///
/// Each provider sits behind a trait so services and handlers can be driven by
/// fakes in tests. Implementations are thin request/response wrappers and never
/// retry.
use crate::{error::AppResult, models::Movie, voice::VoiceError};

pub mod elevenlabs;
pub mod gemini;
pub mod omdb;

pub use elevenlabs::ElevenLabsProvider;
pub use gemini::GeminiProvider;
pub use omdb::OmdbProvider;

/// Read-only title/metadata lookups
///
/// "Not found" is never an error: searches come back empty and lookups come
/// back `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieDatabase: Send + Sync {
    /// Keyword search, in the provider's relevance order
    async fn search(&self, query: &str) -> AppResult<Vec<Movie>>;

    /// Full record by identifier
    async fn get_by_id(&self, id: &str) -> AppResult<Option<Movie>>;

    /// Full record by exact title
    ///
    /// Transport and parse failures are swallowed and reported as `None` so a
    /// batch of lookups can partially fail.
    async fn get_by_title(&self, title: &str) -> Option<Movie>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Single-prompt text generation
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model's first candidate text, possibly empty
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// Conversational speech provider
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Requests a short-lived signed session URL for `agent_id`
    async fn signed_url(&self, api_key: &str, agent_id: &str) -> Result<String, VoiceError>;
}
