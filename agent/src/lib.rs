//! Dialogue-progression and guardrail core for the student-persona
//! assistant: conversation memory, topic state machine, question
//! generation, safety gating, session persistence and orchestration.

pub mod assistant;
pub mod dataset;
pub mod errors;
pub mod generator;
pub mod guardrails;
pub mod memory;
pub mod session;
pub mod topics;

pub use assistant::StudentAssistant;
pub use errors::{AgentError, AgentResult};
pub use generator::{GeneratedQuestion, QuestionGenerator};
pub use guardrails::{GuardrailGate, GuardrailVerdict, SimilarityScorer, TokenOverlapScorer};
pub use memory::ConversationMemory;
pub use session::{Session, SessionRecord, SessionStore};
pub use topics::{TopicState, TopicTracker};
