use socratic_core::{Embedder, LlmBackend};
use socratic_index::VectorIndex;
use tracing::debug;

use crate::errors::AgentResult;
use crate::memory::ConversationMemory;

/// A candidate question together with the supporting context retrieved for
/// it. The caller appends it to memory only after the output guardrail
/// check passes, so a blocked candidate never pollutes history.
#[derive(Debug, Clone)]
pub struct GeneratedQuestion {
    pub text: String,
    pub context: String,
}

/// Composes prompts for initial and follow-up questions. Holds no
/// conversation state; memory and topic are passed in per call.
pub struct QuestionGenerator {
    persona: String,
    retrieval_k: usize,
    context_window: usize,
}

impl QuestionGenerator {
    pub fn new(persona: impl Into<String>, retrieval_k: usize, context_window: usize) -> Self {
        Self {
            persona: persona.into(),
            retrieval_k,
            context_window,
        }
    }

    /// Opens a topic: retrieval is conditioned on the topic name itself.
    /// A generation failure propagates to the caller; there is no retry.
    pub async fn generate_initial(
        &self,
        topic: &str,
        index: &VectorIndex,
        embedder: &dyn Embedder,
        backend: &dyn LlmBackend,
    ) -> AgentResult<GeneratedQuestion> {
        let passages = index.query(topic, self.retrieval_k, embedder).await?;
        let context = passages.join("\n");
        debug!(topic, passages = passages.len(), "Generating initial question");

        let prompt = format!(
            "As a student studying this research paper, generate a thoughtful initial question \
             about the {topic}.\n\
             Use this context from the paper:\n{context}\n\n\
             Frame a specific, focused question that shows engagement with the material and \
             seeks deeper understanding. The question should be directly related to the content \
             found in the context.",
        );

        let text = backend.complete(&prompt).await?;
        Ok(GeneratedQuestion { text, context })
    }

    /// Builds on the examiner's latest message: retrieval is conditioned on
    /// the inbound message rather than the topic label, so follow-ups track
    /// the specific sub-thread the examiner raised, while the topic name in
    /// the prompt prevents drift.
    pub async fn generate_followup(
        &self,
        inbound: &str,
        topic: &str,
        memory: &ConversationMemory,
        index: &VectorIndex,
        embedder: &dyn Embedder,
        backend: &dyn LlmBackend,
    ) -> AgentResult<GeneratedQuestion> {
        let passages = index.query(inbound, self.retrieval_k, embedder).await?;
        let context = passages.join("\n");
        let history = format_history(memory, self.context_window);
        debug!(topic, passages = passages.len(), "Generating follow-up question");

        let prompt = format!(
            "As a student with this persona:\n{persona}\n\n\
             Given the teacher's response and the paper context:\n\
             Teacher's response: {inbound}\n\n\
             Paper context:\n{context}\n\n\
             Recent conversation history:\n{history}\n\n\
             Generate a focused follow-up question that:\n\
             1. Builds on the teacher's response\n\
             2. References specific content from the paper\n\
             3. Shows understanding while seeking deeper insight\n\
             4. Maintains focus on the current topic: {topic}\n\n\
             Keep your question concise and specific.",
            persona = self.persona,
        );

        let text = backend.complete(&prompt).await?;
        Ok(GeneratedQuestion { text, context })
    }
}

/// Formats the bounded recent history as speaker-labelled lines.
pub(crate) fn format_history(memory: &ConversationMemory, window: usize) -> String {
    memory
        .recent(window)
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}
