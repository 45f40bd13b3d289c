pub mod message;
pub mod movie;
pub mod settings;

pub use message::{Message, Origin};
pub use movie::{dedup_by_id, Movie};
pub use settings::VoiceCredentials;
