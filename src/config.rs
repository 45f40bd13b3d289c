use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// OMDb API key
    pub omdb_api_key: String,

    /// OMDb base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Gemini models base URL (the model name and `:generateContent` are appended)
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Gemini model name
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// ElevenLabs API base URL
    #[serde(default = "default_elevenlabs_api_url")]
    pub elevenlabs_api_url: String,

    /// Where voice credentials are persisted
    #[serde(default = "default_settings_path")]
    pub settings_path: String,

    /// Treat unmatched user utterances as a search phrase
    #[serde(default = "default_voice_fallback_search")]
    pub voice_fallback_search: bool,

    /// Timeout for every outbound request, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_elevenlabs_api_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_settings_path() -> String {
    "cineai-settings.json".to_string()
}

fn default_voice_fallback_search() -> bool {
    true
}

fn default_http_timeout_secs() -> u64 {
    15
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
