use std::path::PathBuf;

use crate::{
    error::{AppError, AppResult},
    models::VoiceCredentials,
};

/// File-backed store for the voice credentials
///
/// Loaded once at startup and written through on every change.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    credentials: VoiceCredentials,
}

impl SettingsStore {
    /// Reads the settings file, starting empty when it does not exist yet
    ///
    /// An unreadable or corrupt file is logged and treated as empty; the next
    /// save replaces it.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let credentials = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<VoiceCredentials>(&contents) {
                Ok(credentials) => credentials,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt settings file");
                    VoiceCredentials::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => VoiceCredentials::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read settings file");
                VoiceCredentials::default()
            }
        };

        tracing::info!(
            path = %path.display(),
            has_api_key = credentials.has_api_key(),
            has_agent_id = credentials.has_agent_id(),
            "Voice settings loaded"
        );

        Self { path, credentials }
    }

    pub fn credentials(&self) -> &VoiceCredentials {
        &self.credentials
    }

    /// Replaces the stored values and writes them to disk
    pub async fn save(&mut self, credentials: VoiceCredentials) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(&credentials)
            .map_err(|e| AppError::Settings(e.to_string()))?;

        tokio::fs::write(&self.path, contents).await.map_err(|e| {
            AppError::Settings(format!("failed to write {}: {}", self.path.display(), e))
        })?;

        self.credentials = credentials;
        tracing::info!(path = %self.path.display(), "Voice settings saved");
        Ok(())
    }
}
