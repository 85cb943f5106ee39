use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socratic_core::Role;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use crate::errors::{AgentError, AgentResult};
use crate::memory::ConversationMemory;

/// One live conversation. Owned exclusively by the assistant; exactly one
/// session is live at a time.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub memory: ConversationMemory,
    /// Top retrieved passage per accepted examiner message, accumulated as
    /// the conversation runs and emitted with the persisted record.
    pub context_examples: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string()[..10].to_string(),
            start_time: Utc::now(),
            memory: ConversationMemory::new(),
            context_examples: Vec::new(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Message shape inside a persisted session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedMessage {
    pub role: Role,
    pub content: String,
}

/// What gets appended to the sessions file when a session closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub final_topic: Option<String>,
    pub messages: Vec<RecordedMessage>,
    pub context_examples: Vec<String>,
}

/// Append-only list-of-records store with read-modify-write whole-file
/// semantics. A missing or unparsable store is treated as an empty list;
/// write failures propagate.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All previously persisted records. Never fails: unreadable or corrupt
    /// stores degrade to an empty list.
    pub fn load_all(&self) -> Vec<SessionRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e,
                      "Sessions file is unparsable; treating as empty");
                Vec::new()
            }
        }
    }

    /// Appends one record, rewriting the whole file.
    pub fn append(&self, record: &SessionRecord) -> AgentResult<()> {
        let mut records = self.load_all();
        records.push(record.clone());

        let content = serde_json::to_string_pretty(&records)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AgentError::Persistence(format!("failed to create sessions dir: {}", e))
                })?;
            }
        }
        fs::write(&self.path, content)
            .map_err(|e| AgentError::Persistence(format!("failed to write sessions file: {}", e)))
    }
}
