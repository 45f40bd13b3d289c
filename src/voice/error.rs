use serde::Serialize;

/// Why a voice session could not be started or used
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("speech provider rejected the API key")]
    Unauthorized,

    #[error("voice agent is missing or unknown")]
    MissingAgent,

    #[error("no voice session is connected")]
    NotConnected,

    #[error("voice session failed: {0}")]
    Unknown(String),
}

/// Failure as reported to the browser
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VoiceFailure {
    pub cause: &'static str,
    pub message: &'static str,
}

impl VoiceError {
    /// Machine-readable cause tag
    pub fn cause(&self) -> &'static str {
        match self {
            VoiceError::PermissionDenied => "permission",
            VoiceError::Unauthorized => "authorization",
            VoiceError::MissingAgent => "missing_agent",
            VoiceError::NotConnected => "not_connected",
            VoiceError::Unknown(_) => "unknown",
        }
    }

    /// Actionable message for the user, keyed by cause
    pub fn user_message(&self) -> &'static str {
        match self {
            VoiceError::PermissionDenied => {
                "Microphone access was denied. Please allow microphone access and try again."
            }
            VoiceError::Unauthorized => {
                "Invalid ElevenLabs API key. Please check your credentials in the voice settings."
            }
            VoiceError::MissingAgent => {
                "Voice agent not found. Please check the agent ID in the voice settings."
            }
            VoiceError::NotConnected => "The voice assistant is not connected.",
            VoiceError::Unknown(_) => "Failed to start the voice assistant. Please try again.",
        }
    }

    pub fn to_failure(&self) -> VoiceFailure {
        VoiceFailure {
            cause: self.cause(),
            message: self.user_message(),
        }
    }
}
