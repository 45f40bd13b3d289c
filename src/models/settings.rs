use serde::{Deserialize, Serialize};

/// Speech provider credentials, stored under fixed keys
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceCredentials {
    #[serde(rename = "elevenlabs_api_key", default)]
    pub api_key: String,
    #[serde(rename = "elevenlabs_agent_id", default)]
    pub agent_id: String,
}

impl VoiceCredentials {
    pub fn new(api_key: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            agent_id: agent_id.into(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn has_agent_id(&self) -> bool {
        !self.agent_id.trim().is_empty()
    }

    /// API key with all but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}
