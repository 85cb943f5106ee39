pub mod client;
pub mod config;
pub mod errors;
pub mod types;

pub use client::{Embedder, LlmBackend, OpenAiClient};
pub use config::AssistantConfig;
pub use errors::{CoreError, CoreResult};
pub use types::{ConversationTurn, Role};
