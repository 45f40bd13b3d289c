/// ElevenLabs Conversational AI provider
///
/// Only the signed-URL handshake runs server side. The browser opens the
/// session itself with the returned URL and relays transcript events back.
use crate::{services::providers::SpeechProvider, voice::VoiceError};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

const XI_API_KEY_HEADER: &str = "xi-api-key";

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    signed_url: String,
}

#[derive(Clone)]
pub struct ElevenLabsProvider {
    http_client: HttpClient,
    api_url: String,
}

impl ElevenLabsProvider {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url,
        }
    }
}

/// Maps a failed handshake status to the cause shown to the user
fn classify_status(status: StatusCode, body: &str) -> VoiceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VoiceError::Unauthorized,
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => VoiceError::MissingAgent,
        _ => VoiceError::Unknown(format!("ElevenLabs returned status {}: {}", status, body)),
    }
}

#[async_trait::async_trait]
impl SpeechProvider for ElevenLabsProvider {
    async fn signed_url(&self, api_key: &str, agent_id: &str) -> Result<String, VoiceError> {
        let url = format!(
            "{}/v1/convai/conversation/get_signed_url",
            self.api_url.trim_end_matches('/')
        );

        let response = self
            .http_client
            .get(&url)
            .header(XI_API_KEY_HEADER, api_key)
            .query(&[("agent_id", agent_id)])
            .send()
            .await
            .map_err(|e| VoiceError::Unknown(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, agent_id = %agent_id, "Signed URL request rejected");
            return Err(classify_status(status, &body));
        }

        let parsed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Unknown(format!("Invalid signed URL response: {}", e)))?;

        tracing::info!(agent_id = %agent_id, "Signed URL obtained");
        Ok(parsed.signed_url)
    }
}
