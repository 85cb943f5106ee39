//! Offline synthesis of multi-turn training conversations: for each sampled
//! topic, a persona pair talks through the paper via the LLM backend, and
//! the exchange is emitted as a JSON dataset for the evaluation tooling.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use socratic_core::{Embedder, LlmBackend};
use socratic_index::VectorIndex;
use tracing::info;

use crate::errors::AgentResult;

/// A message in a synthesized conversation. Roles are the raw wire strings
/// (`system` / `user` / `assistant`) since persona descriptions are carried
/// as system messages alongside the dialogue itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMessage {
    pub role: String,
    pub content: String,
}

/// One synthesized conversation with the context it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConversation {
    pub topic: String,
    pub persona_pair: String,
    pub initiator: String,
    pub messages: Vec<DatasetMessage>,
    pub context: String,
}

/// A pair of system personas plus which side usually opens the exchange.
#[derive(Debug, Clone)]
pub struct PersonaPair {
    pub name: String,
    pub user_persona: String,
    pub assistant_persona: String,
    pub typical_initiator: String,
}

impl PersonaPair {
    /// The default teacher/student pairing used by the reference dataset.
    pub fn student_teacher() -> Self {
        Self {
            name: "student_teacher".to_string(),
            user_persona: "You are a teacher who explains relevant portions of the report, \
                           clears concepts and encourages deeper understanding."
                .to_string(),
            assistant_persona: "You are a curious student who asks detailed questions about \
                                the contents of a report"
                .to_string(),
            typical_initiator: "assistant".to_string(),
        }
    }
}

/// Drives dataset synthesis against an index and an LLM backend.
pub struct DatasetGenerator {
    topics: Vec<String>,
    persona_pairs: Vec<PersonaPair>,
    retrieval_k: usize,
}

impl DatasetGenerator {
    pub fn new(topics: Vec<String>, retrieval_k: usize) -> Self {
        Self {
            topics,
            persona_pairs: vec![PersonaPair::student_teacher()],
            retrieval_k,
        }
    }

    /// Synthesizes up to `num_conversations` conversations, one per topic
    /// sampled without replacement.
    pub async fn generate<R: Rng>(
        &self,
        index: &VectorIndex,
        embedder: &dyn Embedder,
        backend: &dyn LlmBackend,
        num_conversations: usize,
        rng: &mut R,
    ) -> AgentResult<Vec<DatasetConversation>> {
        let count = self.topics.len().min(num_conversations);
        let topics: Vec<String> = self
            .topics
            .choose_multiple(rng, count)
            .cloned()
            .collect();

        let mut dataset = Vec::with_capacity(topics.len());
        for topic in topics {
            let pair = self
                .persona_pairs
                .choose(rng)
                .expect("at least one persona pair is always configured")
                .clone();

            // Usually the typical side opens; occasionally flip it.
            let initiator = if rng.gen_bool(0.8) {
                pair.typical_initiator.clone()
            } else if pair.typical_initiator == "assistant" {
                "user".to_string()
            } else {
                "assistant".to_string()
            };

            let num_turns = rng.gen_range(4..=5);
            let conversation = self
                .generate_conversation(&topic, &pair, &initiator, num_turns, index, embedder, backend)
                .await?;
            info!(topic = %conversation.topic, messages = conversation.messages.len(),
                  "Synthesized conversation");
            dataset.push(conversation);
        }

        Ok(dataset)
    }

    #[allow(clippy::too_many_arguments)]
    async fn generate_conversation(
        &self,
        topic: &str,
        pair: &PersonaPair,
        initiator: &str,
        num_turns: usize,
        index: &VectorIndex,
        embedder: &dyn Embedder,
        backend: &dyn LlmBackend,
    ) -> AgentResult<DatasetConversation> {
        let passages = index.query(topic, self.retrieval_k, embedder).await?;
        let context = passages.join(" ");

        let mut messages = vec![
            DatasetMessage {
                role: "system".to_string(),
                content: format!("Context: {}", context),
            },
            DatasetMessage {
                role: "system".to_string(),
                content: pair.user_persona.clone(),
            },
            DatasetMessage {
                role: "system".to_string(),
                content: pair.assistant_persona.clone(),
            },
        ];

        let opening = self.initial_prompt(topic, pair, initiator);
        let initial = backend.complete(&opening).await?;
        messages.push(DatasetMessage {
            role: initiator.to_string(),
            content: initial,
        });

        let mut speaker = if initiator == "user" { "assistant" } else { "user" };
        for _ in 0..num_turns {
            let prompt = self.followup_prompt(topic, speaker, &messages);
            let content = backend.complete(&prompt).await?;
            messages.push(DatasetMessage {
                role: speaker.to_string(),
                content,
            });
            speaker = if speaker == "assistant" { "user" } else { "assistant" };
        }

        Ok(DatasetConversation {
            topic: topic.to_string(),
            persona_pair: pair.name.clone(),
            initiator: initiator.to_string(),
            messages,
            context,
        })
    }

    fn initial_prompt(&self, topic: &str, pair: &PersonaPair, initiator: &str) -> String {
        if initiator == "assistant" {
            format!(
                "As a {persona}, generate a short and simple initial question about {topic}. \
                 The question should reflect your persona's perspective as a curious student. \
                 Keep the question focused on understanding the {topic} section of the report.",
                persona = pair.assistant_persona,
            )
        } else {
            format!(
                "As a {persona}, generate a short and to-the-point explanation about {topic}. \
                 The response should reflect your role as a teacher explaining the content.",
                persona = pair.user_persona,
            )
        }
    }

    fn followup_prompt(&self, topic: &str, speaker: &str, messages: &[DatasetMessage]) -> String {
        let history = messages
            .iter()
            .filter(|m| m.role == "user" || m.role == "assistant")
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");

        if speaker == "assistant" {
            format!(
                "As a curious student, generate a follow-up question about {topic} based on \
                 the previous responses. Focus on asking for clarification or deeper \
                 understanding of the content.\n\nPrevious conversation:\n{history}\n\n\
                 Generate a natural follow-up question that demonstrates curiosity and desire \
                 to learn more.",
            )
        } else {
            format!(
                "As a teacher, generate a detailed explanation in response to the student's \
                 question about {topic}.\n\nPrevious conversation:\n{history}\n\n\
                 Provide a clear and informative response that helps the student understand \
                 the content better.",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use socratic_core::CoreResult;

    struct UnitEmbedder;

    #[async_trait]
    impl Embedder for UnitEmbedder {
        async fn embed(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0]).collect())
        }
    }

    struct EchoBackend;

    #[async_trait]
    impl LlmBackend for EchoBackend {
        async fn complete(&self, prompt: &str) -> CoreResult<String> {
            Ok(format!("reply to: {}", &prompt[..20.min(prompt.len())]))
        }
    }

    #[tokio::test]
    async fn generates_one_conversation_per_sampled_topic() {
        let index = VectorIndex::build("a report about machine learning methods", &UnitEmbedder)
            .await
            .unwrap();
        let generator = DatasetGenerator::new(
            vec!["motivation".to_string(), "findings".to_string()],
            3,
        );
        let mut rng = StdRng::seed_from_u64(7);

        let dataset = generator
            .generate(&index, &UnitEmbedder, &EchoBackend, 5, &mut rng)
            .await
            .unwrap();

        // Capped by the number of topics; each topic appears once.
        assert_eq!(dataset.len(), 2);
        let mut topics: Vec<&str> = dataset.iter().map(|c| c.topic.as_str()).collect();
        topics.sort_unstable();
        assert_eq!(topics, vec!["findings", "motivation"]);
    }

    #[tokio::test]
    async fn conversations_alternate_speakers_after_the_opener() {
        let index = VectorIndex::build("a report about machine learning methods", &UnitEmbedder)
            .await
            .unwrap();
        let generator = DatasetGenerator::new(vec!["experiments".to_string()], 3);
        let mut rng = StdRng::seed_from_u64(42);

        let dataset = generator
            .generate(&index, &UnitEmbedder, &EchoBackend, 1, &mut rng)
            .await
            .unwrap();
        let conversation = &dataset[0];

        // Three leading system messages: context plus both personas.
        assert!(conversation.messages[..3]
            .iter()
            .all(|m| m.role == "system"));
        assert_eq!(conversation.messages[3].role, conversation.initiator);

        let dialogue: Vec<&str> = conversation.messages[3..]
            .iter()
            .map(|m| m.role.as_str())
            .collect();
        assert!(dialogue.len() >= 5); // opener + 4..=5 turns
        for pair in dialogue.windows(2) {
            assert_ne!(pair[0], pair[1], "speakers must alternate");
        }
        assert!(!conversation.context.is_empty());
    }
}
