use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, models::VoiceCredentials, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct UpdateVoiceSettings {
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
}

/// Stored credentials as shown to the browser; the key is never echoed in full
#[derive(Debug, Serialize)]
pub struct VoiceSettingsResponse {
    pub api_key: String,
    pub agent_id: String,
    pub has_api_key: bool,
    pub has_agent_id: bool,
}

impl From<&VoiceCredentials> for VoiceSettingsResponse {
    fn from(credentials: &VoiceCredentials) -> Self {
        Self {
            api_key: credentials.masked_api_key(),
            agent_id: credentials.agent_id.clone(),
            has_api_key: credentials.has_api_key(),
            has_agent_id: credentials.has_agent_id(),
        }
    }
}

pub async fn get_voice(State(state): State<AppState>) -> Json<VoiceSettingsResponse> {
    let settings = state.settings.read().await;
    Json(VoiceSettingsResponse::from(settings.credentials()))
}

/// Handler for credential changes; omitted fields keep their stored value
pub async fn update_voice(
    State(state): State<AppState>,
    Json(request): Json<UpdateVoiceSettings>,
) -> AppResult<Json<VoiceSettingsResponse>> {
    let mut settings = state.settings.write().await;

    let current = settings.credentials();
    let updated = VoiceCredentials::new(
        request
            .api_key
            .map(|k| k.trim().to_string())
            .unwrap_or_else(|| current.api_key.clone()),
        request
            .agent_id
            .map(|a| a.trim().to_string())
            .unwrap_or_else(|| current.agent_id.clone()),
    );

    settings.save(updated).await?;
    Ok(Json(VoiceSettingsResponse::from(settings.credentials())))
}
