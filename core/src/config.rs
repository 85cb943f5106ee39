use crate::errors::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_PERSONA: &str = "You are a curious and engaged student who is carefully studying a \
research paper. You ask thoughtful questions about specific aspects of the paper, seek \
clarification when needed, and try to build connections between different sections. Your \
questions should be focused, specific, and directly related to the paper's content.";

/// Configuration for the assistant: backend access, persona, topic sequence
/// and guardrail policy. Loaded from a TOML file, with defaults mirroring the
/// reference deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// API key for the LLM backend. Falls back to `OPENAI_API_KEY` when unset.
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    /// Persona description injected into every generation prompt.
    pub persona: String,
    /// Ordered discourse phases the conversation walks through.
    pub topics: Vec<String>,
    /// Exchanges (question + answer) spent on a topic before advancing.
    pub exchange_quota: usize,
    /// Number of recent turns used for prompt construction.
    pub context_window: usize,
    /// Passages retrieved per generation.
    pub retrieval_k: usize,
    /// Case-insensitive terms that always block a message.
    pub denylist: Vec<String>,
    /// Minimum similarity between a candidate question and its supporting
    /// context, on a 0-1 scale.
    pub grounding_threshold: f32,
    pub cache_dir: PathBuf,
    pub sessions_file: PathBuf,
    pub log_level: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            temperature: 0.7,
            persona: DEFAULT_PERSONA.to_string(),
            topics: vec![
                "motivation".to_string(),
                "problem statement".to_string(),
                "comparison with existing models".to_string(),
                "proposed methodology".to_string(),
                "experiments".to_string(),
                "findings".to_string(),
                "conclusions".to_string(),
            ],
            exchange_quota: 3,
            context_window: 5,
            retrieval_k: 3,
            denylist: vec![
                "confidential".to_string(),
                "proprietary".to_string(),
                "secret".to_string(),
                "classified".to_string(),
                "internal only".to_string(),
                "restricted".to_string(),
                "merge sort".to_string(),
            ],
            grounding_threshold: 0.3,
            cache_dir: PathBuf::from(".cache"),
            sessions_file: PathBuf::from("conversation_sessions.json"),
            log_level: None,
        }
    }
}

impl AssistantConfig {
    /// Loads configuration from a file if it exists, otherwise returns the
    /// default config.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                CoreError::ConfigError(format!("Failed to read config file: {}", e))
            })?;
            let config: Self = toml::from_str(&content).map_err(|e| {
                CoreError::ConfigError(format!("Failed to parse config file: {}", e))
            })?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to a file, creating parent directories as needed.
    pub fn save_to_file(&self, path: &Path) -> CoreResult<()> {
        let content = toml::to_string(self)
            .map_err(|e| CoreError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CoreError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content)
            .map_err(|e| CoreError::ConfigError(format!("Failed to write config file: {}", e)))
    }

    /// Default config location under the user config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("socratic").join("config.toml"))
    }

    /// The API key from config, falling back to the environment.
    pub fn resolve_api_key(&self) -> CoreResult<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                CoreError::ConfigError(
                    "API key is required: set `api_key` in the config file or the \
                     OPENAI_API_KEY environment variable"
                        .to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_topics_are_ordered_phases() {
        let config = AssistantConfig::default();
        assert_eq!(config.topics.first().map(String::as_str), Some("motivation"));
        assert_eq!(config.topics.last().map(String::as_str), Some("conclusions"));
        assert_eq!(config.topics.len(), 7);
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AssistantConfig::load_from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.exchange_quota, 3);
        assert_eq!(config.grounding_threshold, 0.3);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let mut config = AssistantConfig::default();
        config.chat_model = "test-model".to_string();
        config.denylist.push("off-limits".to_string());
        config.save_to_file(&path).unwrap();

        let loaded = AssistantConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.chat_model, "test-model");
        assert!(loaded.denylist.contains(&"off-limits".to_string()));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();

        assert!(AssistantConfig::load_from_file(&path).is_err());
    }
}
