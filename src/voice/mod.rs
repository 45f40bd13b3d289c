pub mod error;
pub mod intent;
pub mod session;

pub use error::{VoiceError, VoiceFailure};
pub use intent::{Intent, IntentExtractor};
pub use session::{
    EventOutcome, MicrophonePermission, SessionEvent, SessionState, SessionStatus,
    TranscriptEvent, VoiceController, VoiceSearch,
};
