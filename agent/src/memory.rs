use socratic_core::ConversationTurn;

/// Ordered conversation history owned by one session. Turns are immutable
/// once appended; only a bounded suffix is read for prompt construction,
/// while the full sequence is retained for persistence.
#[derive(Debug, Default)]
pub struct ConversationMemory {
    turns: Vec<ConversationTurn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// The last `min(window, len)` turns in original order. All prompt
    /// construction goes through this bounded view.
    pub fn recent(&self, window: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(window);
        &self.turns[start..]
    }

    /// The full history, used only at persistence time.
    pub fn full(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drops all turns. Only valid as part of a full session reset.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socratic_core::Role;

    fn turn(i: usize) -> ConversationTurn {
        if i % 2 == 0 {
            ConversationTurn::assistant(format!("question {}", i))
        } else {
            ConversationTurn::examiner(format!("answer {}", i))
        }
    }

    #[test]
    fn append_then_recent_returns_bounded_suffix_in_order() {
        let mut memory = ConversationMemory::new();
        for i in 0..8 {
            memory.append(turn(i));
        }

        let recent = memory.recent(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].content, "answer 3");
        assert_eq!(recent[4].content, "answer 7");
    }

    #[test]
    fn recent_window_larger_than_history_returns_everything() {
        let mut memory = ConversationMemory::new();
        memory.append(turn(0));
        memory.append(turn(1));

        let recent = memory.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].role, Role::Assistant);
        assert_eq!(recent[1].role, Role::Examiner);
    }

    #[test]
    fn full_preserves_insertion_order() {
        let mut memory = ConversationMemory::new();
        for i in 0..4 {
            memory.append(turn(i));
        }
        let contents: Vec<&str> = memory.full().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["question 0", "answer 1", "question 2", "answer 3"]
        );
    }

    #[test]
    fn clear_empties_history() {
        let mut memory = ConversationMemory::new();
        memory.append(turn(0));
        assert!(!memory.is_empty());
        memory.clear();
        assert!(memory.is_empty());
        assert!(memory.recent(5).is_empty());
    }
}
