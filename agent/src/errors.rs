use thiserror::Error;

/// Errors surfaced by the dialogue core. Guardrail blocks are not errors;
/// they are expected control-flow outcomes with substitute messages.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The LLM backend failed. Not recovered here; fatal for the turn.
    #[error("generation failed: {0}")]
    Generation(#[from] socratic_core::CoreError),

    #[error(transparent)]
    Index(#[from] socratic_index::IndexError),

    #[error("no topics configured")]
    NoTopics,

    #[error("session persistence failed: {0}")]
    Persistence(String),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
