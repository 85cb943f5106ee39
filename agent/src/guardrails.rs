use tracing::debug;

/// Fixed redirect shown when an inbound message is blocked.
pub const INPUT_REDIRECT: &str = "It seems you are talking about something not covered in the \
research paper. Could you please focus on the topics discussed in the research paper?";

/// Fixed fallback returned when a generated candidate is blocked.
pub const OUTPUT_FALLBACK: &str = "I apologize, but I need to reformulate my question. Could we \
continue discussing the current topic?";

/// Outcome of screening one candidate message. Ephemeral; never persisted.
#[derive(Debug, Clone)]
pub struct GuardrailVerdict {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl GuardrailVerdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Pluggable textual-similarity strategy used by the grounding check.
/// Scores are on a normalized 0-1 scale; the gate's blocking logic never
/// changes when the scorer is swapped out.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, context: &str, candidate: &str) -> f32;
}

/// Fraction of candidate tokens that also occur in the supporting context
/// (multiset containment, lowercase). A candidate drawn entirely from the
/// context scores 1.0; this stays meaningful when the context is much
/// longer than the candidate.
#[derive(Debug, Default)]
pub struct TokenOverlapScorer;

impl SimilarityScorer for TokenOverlapScorer {
    fn score(&self, context: &str, candidate: &str) -> f32 {
        let candidate_tokens: Vec<String> = candidate
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if candidate_tokens.is_empty() {
            return 0.0;
        }

        let mut available = std::collections::HashMap::new();
        for token in context.split_whitespace() {
            *available.entry(token.to_lowercase()).or_insert(0usize) += 1;
        }

        let mut matched = 0usize;
        for token in &candidate_tokens {
            if let Some(count) = available.get_mut(token) {
                if *count > 0 {
                    *count -= 1;
                    matched += 1;
                }
            }
        }

        matched as f32 / candidate_tokens.len() as f32
    }
}

/// Binary policy gate applied to both directions of traffic. Stateless:
/// constructed once from the fixed policy configuration and reused as a
/// pure function of (candidate text, optional supporting context). It
/// never mutates conversation memory; recording substitute messages is
/// the caller's responsibility.
pub struct GuardrailGate {
    denylist: Vec<String>,
    threshold: f32,
    scorer: Box<dyn SimilarityScorer>,
}

impl GuardrailGate {
    pub fn new(denylist: &[String], threshold: f32) -> Self {
        Self::with_scorer(denylist, threshold, Box::new(TokenOverlapScorer))
    }

    pub fn with_scorer(
        denylist: &[String],
        threshold: f32,
        scorer: Box<dyn SimilarityScorer>,
    ) -> Self {
        Self {
            denylist: denylist.iter().map(|t| t.to_lowercase()).collect(),
            threshold,
            scorer,
        }
    }

    fn prohibited_term(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.denylist
            .iter()
            .find(|term| lowered.contains(term.as_str()))
            .map(String::as_str)
    }

    /// Screens an inbound message. Inbound text carries no supporting
    /// context, so only the prohibited-term policy applies; the grounding
    /// rail is an output rail.
    pub fn check_input(&self, text: &str) -> GuardrailVerdict {
        if let Some(term) = self.prohibited_term(text) {
            debug!(term, "Input blocked by prohibited-term check");
            return GuardrailVerdict::block(format!("contains prohibited term '{}'", term));
        }
        GuardrailVerdict::allow()
    }

    /// Screens a generated candidate against the context retrieved during
    /// its generation. Blocked if either check fires; missing or empty
    /// context blocks conservatively (fail-closed), and borderline
    /// similarity resolves toward blocking.
    pub fn check_output(&self, text: &str, context: Option<&str>) -> GuardrailVerdict {
        if let Some(term) = self.prohibited_term(text) {
            debug!(term, "Output blocked by prohibited-term check");
            return GuardrailVerdict::block(format!("contains prohibited term '{}'", term));
        }

        let context = match context {
            Some(c) if !c.trim().is_empty() => c,
            _ => {
                debug!("Output blocked: no supporting context available");
                return GuardrailVerdict::block("no supporting context available");
            }
        };

        let similarity = self.scorer.score(context, text);
        if similarity < self.threshold {
            debug!(similarity, threshold = self.threshold, "Output blocked by grounding check");
            return GuardrailVerdict::block(format!(
                "similarity {:.2} below threshold {:.2}",
                similarity, self.threshold
            ));
        }

        GuardrailVerdict::allow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denylist() -> Vec<String> {
        vec![
            "confidential".to_string(),
            "proprietary".to_string(),
            "internal only".to_string(),
        ]
    }

    fn gate() -> GuardrailGate {
        GuardrailGate::new(&denylist(), 0.3)
    }

    #[test]
    fn input_with_prohibited_term_is_blocked_case_insensitively() {
        let gate = gate();
        assert!(!gate.check_input("this is CONFIDENTIAL material").allowed);
        assert!(!gate.check_input("strictly Internal Only data").allowed);
        assert!(gate.check_input("what motivates the experiments?").allowed);
    }

    #[test]
    fn input_check_ignores_grounding() {
        // Inbound text has no supporting context; only the term check runs.
        let gate = gate();
        assert!(gate.check_input("completely unrelated ramblings").allowed);
    }

    #[test]
    fn output_fails_closed_without_context() {
        let gate = gate();
        assert!(!gate.check_output("a perfectly fine question", None).allowed);
        assert!(!gate.check_output("a perfectly fine question", Some("   ")).allowed);
    }

    #[test]
    fn denylisted_output_is_blocked_even_with_identical_context() {
        let gate = gate();
        let text = "what about the proprietary method";
        // Identical context means grounding similarity 1.0.
        let verdict = gate.check_output(text, Some(text));
        assert!(!verdict.allowed);
        assert!(verdict.reason.unwrap().contains("proprietary"));
    }

    #[test]
    fn grounded_output_passes() {
        let gate = gate();
        let context = "the study evaluates retrieval augmented generation on scientific papers \
                       using rubric based metrics";
        let verdict = gate.check_output(
            "how does retrieval augmented generation help scientific papers?",
            Some(context),
        );
        assert!(verdict.allowed, "reason: {:?}", verdict.reason);
    }

    #[test]
    fn ungrounded_output_is_blocked() {
        let gate = gate();
        let verdict = gate.check_output(
            "unrelated cooking recipe nonsense entirely",
            Some("the study evaluates retrieval augmented generation"),
        );
        assert!(!verdict.allowed);
    }

    #[test]
    fn identical_text_scores_one() {
        let scorer = TokenOverlapScorer;
        assert!((scorer.score("a b c", "a b c") - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn overlap_is_multiset_aware() {
        let scorer = TokenOverlapScorer;
        // Context has only one "the"; candidate uses it twice.
        assert!(scorer.score("the paper", "the the") < 1.0);
        assert_eq!(scorer.score("anything", ""), 0.0);
    }

    #[test]
    fn similarity_at_threshold_passes_below_blocks() {
        // 1 of 2 candidate tokens in context = 0.5
        let gate = GuardrailGate::new(&[], 0.5);
        assert!(gate.check_output("alpha beta", Some("alpha gamma")).allowed);

        let gate = GuardrailGate::new(&[], 0.51);
        assert!(!gate.check_output("alpha beta", Some("alpha gamma")).allowed);
    }
}
