// orchestrator/src/rules/evaluator.rs

use gate_core::{ChatMessage, MemoryDecision};
use tracing::debug;

use super::trigger_rules::{
    RuleCategory, TriggerRuleSet, CONTEXT_BOOST, CONTEXT_BOOST_LABEL, CONTEXT_LONG_MESSAGE_CHARS,
    CONTEXT_MIN_MESSAGES, CONTEXT_WINDOW,
};

/// Deterministic first pass. Cheap, total, never touches the network.
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    rules: TriggerRuleSet,
}

impl RuleEvaluator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self::with_rules(TriggerRuleSet::new()?))
    }

    pub fn with_rules(rules: TriggerRuleSet) -> Self {
        Self { rules }
    }

    pub fn evaluate(&self, message: &str, recent_messages: &[ChatMessage]) -> MemoryDecision {
        let normalized = message.trim().to_lowercase();
        let mut triggers: Vec<String> = Vec::new();
        let mut score: f64 = 0.0;

        // Positive evidence: strongest signal wins, weak ones never add up
        for category in [RuleCategory::Explicit, RuleCategory::Implicit] {
            for rule in self.rules.group(category) {
                if rule.matches(&normalized) {
                    triggers.push(rule.label.to_string());
                    score = score.max(rule.weight);
                }
            }
        }

        // Negative evidence: overrides anything weaker; an equally strong positive signal stays
        for rule in self.rules.group(RuleCategory::Skip) {
            if rule.matches(&normalized) {
                triggers.push(rule.label.to_string());
                score = merge_skip(score, rule.weight);
            }
        }

        if score > 0.0 && is_ongoing_conversation(recent_messages) {
            score = (score + CONTEXT_BOOST).min(1.0);
            triggers.push(CONTEXT_BOOST_LABEL.to_string());
        }

        let needs_memory = score > 0.0;
        let confidence = score.abs().min(1.0);
        let reasoning = if needs_memory {
            format!("Memory triggers: {}", triggers.join(", "))
        } else {
            format!("Skip memory: {}", triggers.first().map(String::as_str).unwrap_or("chat"))
        };

        debug!(score, confidence, ?triggers, "[RuleEvaluator] Rules evaluated");

        MemoryDecision { needs_memory, confidence, triggers, reasoning }
    }
}

fn merge_skip(score: f64, weight: f64) -> f64 {
    if score > 0.0 && score >= weight.abs() {
        score
    } else {
        score.min(weight)
    }
}

fn is_ongoing_conversation(recent_messages: &[ChatMessage]) -> bool {
    if recent_messages.len() <= CONTEXT_MIN_MESSAGES {
        return false;
    }
    recent_messages
        .iter()
        .rev()
        .take(CONTEXT_WINDOW)
        .any(|m| m.content.chars().count() > CONTEXT_LONG_MESSAGE_CHARS)
}
