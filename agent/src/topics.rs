use tracing::info;

/// Where the conversation stands in the fixed topic sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicState {
    /// No question generated yet.
    Unstarted,
    /// Discussing `topics[index]`.
    Active(usize),
    /// Past the last topic; the conversation stays on the final topic
    /// indefinitely (terminal plateau, not a hard stop).
    Exhausted,
}

/// Walks an immutable, ordered topic sequence. The cursor only ever moves
/// forward: it never regresses and never skips. Advancement is driven by
/// stored history length, so it is strictly a function of accepted-message
/// count, never wall-clock time.
#[derive(Debug)]
pub struct TopicTracker {
    topics: Vec<String>,
    state: TopicState,
    /// History length at the moment the current topic became current.
    turns_at_topic_start: usize,
    /// Accepted turns (both sides) spent on a topic before advancing.
    turns_per_topic: usize,
}

impl TopicTracker {
    /// `exchange_quota` counts question/answer exchanges; each contributes
    /// two turns of stored history.
    pub fn new(topics: Vec<String>, exchange_quota: usize) -> Self {
        Self {
            topics,
            state: TopicState::Unstarted,
            turns_at_topic_start: 0,
            turns_per_topic: exchange_quota * 2,
        }
    }

    /// Lazily enters the first topic. Called when the first question is
    /// generated; a no-op in any other state.
    pub fn start(&mut self) {
        if self.state == TopicState::Unstarted && !self.topics.is_empty() {
            self.state = TopicState::Active(0);
            self.turns_at_topic_start = 0;
        }
    }

    /// The topic currently under discussion. `Exhausted` still reports the
    /// final topic.
    pub fn current(&self) -> Option<&str> {
        match self.state {
            TopicState::Unstarted => None,
            TopicState::Active(i) => self.topics.get(i).map(String::as_str),
            TopicState::Exhausted => self.topics.last().map(String::as_str),
        }
    }

    pub fn state(&self) -> &TopicState {
        &self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == TopicState::Exhausted
    }

    /// Whether the quota for the current topic has been met, measured
    /// against stored history length.
    pub fn should_advance(&self, history_len: usize) -> bool {
        match self.state {
            TopicState::Active(_) => {
                history_len.saturating_sub(self.turns_at_topic_start) >= self.turns_per_topic
            }
            _ => false,
        }
    }

    /// Moves to the next topic, or to `Exhausted` from the last one.
    /// Returns true only when a genuinely new topic became current, i.e.
    /// the caller should open it with a fresh initial question.
    pub fn advance(&mut self, history_len: usize) -> bool {
        match self.state {
            TopicState::Active(i) if i + 1 < self.topics.len() => {
                self.state = TopicState::Active(i + 1);
                self.turns_at_topic_start = history_len;
                info!(topic = %self.topics[i + 1], "Advancing to next topic");
                true
            }
            TopicState::Active(_) => {
                self.state = TopicState::Exhausted;
                info!("Topic sequence exhausted; staying on final topic");
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(n: usize) -> TopicTracker {
        let topics = (0..n).map(|i| format!("topic{}", i)).collect();
        TopicTracker::new(topics, 3) // K = 6 turns per topic
    }

    #[test]
    fn unstarted_has_no_current_topic() {
        let t = tracker(3);
        assert_eq!(t.current(), None);
        assert!(!t.should_advance(100));
    }

    #[test]
    fn start_enters_first_topic() {
        let mut t = tracker(3);
        t.start();
        assert_eq!(t.current(), Some("topic0"));

        // start is idempotent
        t.start();
        assert_eq!(t.current(), Some("topic0"));
    }

    #[test]
    fn advances_after_quota_never_before() {
        let mut t = tracker(3);
        t.start();

        for len in 0..6 {
            assert!(!t.should_advance(len), "advanced early at {}", len);
        }
        assert!(t.should_advance(6));

        assert!(t.advance(6));
        assert_eq!(t.current(), Some("topic1"));

        // Quota is counted from the new baseline, not from zero.
        assert!(!t.should_advance(11));
        assert!(t.should_advance(12));
    }

    #[test]
    fn never_skips_a_topic() {
        let mut t = tracker(4);
        t.start();
        let mut seen = vec![t.current().unwrap().to_string()];
        let mut len = 0;
        while !t.is_exhausted() {
            len += 6;
            if t.should_advance(len) {
                t.advance(len);
                if let Some(c) = t.current() {
                    if seen.last().map(String::as_str) != Some(c) {
                        seen.push(c.to_string());
                    }
                }
            }
        }
        assert_eq!(seen, vec!["topic0", "topic1", "topic2", "topic3"]);
    }

    #[test]
    fn plateaus_on_final_topic() {
        let n = 3;
        let mut t = tracker(n);
        t.start();

        // Walk through all topics: after n * K accepted turns the tracker
        // sits on the last topic and never moves again.
        for step in 1..=n {
            let len = step * 6;
            assert!(t.should_advance(len));
            t.advance(len);
        }

        assert!(t.is_exhausted());
        assert_eq!(t.current(), Some("topic2"));
        assert!(!t.should_advance(1000));
        assert!(!t.advance(1000));
        assert_eq!(t.current(), Some("topic2"));
    }

    #[test]
    fn empty_topic_list_never_starts() {
        let mut t = TopicTracker::new(Vec::new(), 3);
        t.start();
        assert_eq!(t.current(), None);
        assert_eq!(*t.state(), TopicState::Unstarted);
    }
}
