pub mod assistant;
pub mod conversation;
pub mod movies;
pub mod providers;
pub mod settings;

pub use assistant::{Assistant, ChatReply};
pub use conversation::Conversation;
pub use settings::SettingsStore;
