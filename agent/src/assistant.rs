use chrono::Utc;
use socratic_core::{AssistantConfig, ConversationTurn, Embedder, LlmBackend};
use socratic_index::VectorIndex;
use tracing::{debug, info, warn};

use crate::errors::{AgentError, AgentResult};
use crate::generator::{GeneratedQuestion, QuestionGenerator};
use crate::guardrails::{GuardrailGate, INPUT_REDIRECT, OUTPUT_FALLBACK};
use crate::session::{RecordedMessage, Session, SessionRecord, SessionStore};
use crate::topics::TopicTracker;

/// The live student-persona assistant. Owns exactly one session at a time
/// and processes turns strictly sequentially: input check, memory mutation,
/// topic-advance decision, generation, output check, return.
pub struct StudentAssistant {
    config: AssistantConfig,
    index: VectorIndex,
    backend: Box<dyn LlmBackend>,
    embedder: Box<dyn Embedder>,
    gate: GuardrailGate,
    generator: QuestionGenerator,
    topics: TopicTracker,
    session: Session,
    store: SessionStore,
}

impl StudentAssistant {
    pub fn new(
        config: AssistantConfig,
        index: VectorIndex,
        backend: Box<dyn LlmBackend>,
        embedder: Box<dyn Embedder>,
    ) -> Self {
        let gate = GuardrailGate::new(&config.denylist, config.grounding_threshold);
        let generator = QuestionGenerator::new(
            config.persona.clone(),
            config.retrieval_k,
            config.context_window,
        );
        let topics = TopicTracker::new(config.topics.clone(), config.exchange_quota);
        let store = SessionStore::new(config.sessions_file.clone());

        Self {
            config,
            index,
            backend,
            embedder,
            gate,
            generator,
            topics,
            session: Session::new(),
            store,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    pub fn current_topic(&self) -> Option<&str> {
        self.topics.current()
    }

    pub fn history_len(&self) -> usize {
        self.session.memory.len()
    }

    /// Generates the opening question, lazily entering the first topic.
    /// The result is appended to memory as an assistant turn.
    pub async fn initial_question(&mut self) -> AgentResult<String> {
        self.topics.start();
        let topic = self.topics.current().ok_or(AgentError::NoTopics)?.to_string();

        let question = self
            .generator
            .generate_initial(&topic, &self.index, self.embedder.as_ref(), self.backend.as_ref())
            .await?;

        self.session
            .memory
            .append(ConversationTurn::assistant(question.text.clone()));
        Ok(question.text)
    }

    /// Processes one inbound examiner message and returns the assistant's
    /// next utterance: the next question, or a guardrail substitute message.
    /// Only a generation failure is an error.
    pub async fn process_message(&mut self, inbound: &str) -> AgentResult<String> {
        // Input gate. On block the inbound message is never added to memory,
        // so re-submitting the same message always takes this same path.
        let verdict = self.gate.check_input(inbound);
        if !verdict.allowed {
            info!(reason = ?verdict.reason, "Inbound message blocked");
            self.session
                .memory
                .append(ConversationTurn::assistant(INPUT_REDIRECT));
            return Ok(INPUT_REDIRECT.to_string());
        }

        self.session
            .memory
            .append(ConversationTurn::examiner(inbound));

        // Remember the best-matching passage for this message; it goes out
        // with the persisted record as a grounding example.
        let mut top = self
            .index
            .query(inbound, 1, self.embedder.as_ref())
            .await?;
        if let Some(passage) = top.pop() {
            self.session.context_examples.push(passage);
        }

        // Topic advancement is a side effect of processing an accepted
        // inbound message, measured on stored history length.
        let history_len = self.session.memory.len();
        let opened_new_topic = if self.topics.current().is_none() {
            self.topics.start();
            true
        } else if self.topics.should_advance(history_len) {
            self.topics.advance(history_len)
        } else {
            false
        };

        let topic = self.topics.current().ok_or(AgentError::NoTopics)?.to_string();

        let candidate: GeneratedQuestion = if opened_new_topic {
            self.generator
                .generate_initial(&topic, &self.index, self.embedder.as_ref(), self.backend.as_ref())
                .await?
        } else {
            self.generator
                .generate_followup(
                    inbound,
                    &topic,
                    &self.session.memory,
                    &self.index,
                    self.embedder.as_ref(),
                    self.backend.as_ref(),
                )
                .await?
        };

        // Output gate, against the context pulled during generation. A
        // blocked candidate is discarded without ever touching memory; the
        // fallback is returned but not recorded either.
        let verdict = self.gate.check_output(&candidate.text, Some(&candidate.context));
        if !verdict.allowed {
            warn!(reason = ?verdict.reason, "Generated candidate blocked");
            return Ok(OUTPUT_FALLBACK.to_string());
        }

        debug!(topic = %topic, "Candidate question accepted");
        self.session
            .memory
            .append(ConversationTurn::assistant(candidate.text.clone()));
        Ok(candidate.text)
    }

    /// Persists the current session to the sessions store and returns the
    /// record that was written.
    pub fn save_session(&self) -> AgentResult<SessionRecord> {
        let record = SessionRecord {
            session_id: self.session.id.clone(),
            start_time: self.session.start_time,
            end_time: Utc::now(),
            final_topic: self.topics.current().map(str::to_string),
            messages: self
                .session
                .memory
                .full()
                .iter()
                .map(|turn| RecordedMessage {
                    role: turn.role,
                    content: turn.content.clone(),
                })
                .collect(),
            context_examples: self.session.context_examples.clone(),
        };

        self.store.append(&record)?;
        info!(session_id = %record.session_id, messages = record.messages.len(), "Session saved");
        Ok(record)
    }

    /// Persists the current session if it has any messages, then starts a
    /// fresh one with the topic cursor back at unstarted.
    pub fn reset(&mut self) -> AgentResult<Option<SessionRecord>> {
        let saved = if self.session.memory.is_empty() {
            None
        } else {
            Some(self.save_session()?)
        };

        self.session = Session::new();
        self.topics = TopicTracker::new(self.config.topics.clone(), self.config.exchange_quota);
        Ok(saved)
    }

    pub fn sessions_path(&self) -> &std::path::Path {
        self.store.path()
    }
}
