// orchestrator/tests/rule_properties.rs

use gate_core::{ChatMessage, MemoryDecision};
use orchestrator::{cache_key, DecisionCache, RuleEvaluator};
use proptest::prelude::*;
use std::time::Duration;

fn history_strategy() -> impl Strategy<Value = Vec<ChatMessage>> {
    prop::collection::vec(
        (prop_oneof!["user", "assistant"], ".{0,120}").prop_map(|(role, content)| ChatMessage::new(role, content)),
        0..6,
    )
}

proptest! {
    #[test]
    fn confidence_is_always_within_unit_range(message in ".{0,200}", history in history_strategy()) {
        let evaluator = RuleEvaluator::new().unwrap();
        let decision = evaluator.evaluate(&message, &history);
        prop_assert!((0.0..=1.0).contains(&decision.confidence));
        if decision.needs_memory {
            prop_assert!(decision.confidence > 0.0);
        }
    }

    #[test]
    fn explicit_trigger_always_wins(prefix in "[a-z ]{0,30}", suffix in "[a-z ]{0,30}") {
        let evaluator = RuleEvaluator::new().unwrap();
        let message = format!("{prefix} do you remember {suffix}");
        let decision = evaluator.evaluate(&message, &[]);
        prop_assert!(decision.needs_memory);
        prop_assert!(decision.confidence >= 0.9);
    }

    #[test]
    fn cache_key_is_deterministic(message in ".{0,200}", history in history_strategy()) {
        prop_assert_eq!(cache_key(&message, &history), cache_key(&message, &history));
    }

    #[test]
    fn cache_size_never_exceeds_capacity(keys in prop::collection::vec("[a-z]{1,8}", 0..200), capacity in 1usize..60) {
        let mut cache = DecisionCache::with_limits(capacity, Duration::from_secs(60));
        for key in keys {
            cache.put(key, MemoryDecision {
                needs_memory: true,
                confidence: 0.5,
                triggers: vec![],
                reasoning: String::new(),
            });
            prop_assert!(cache.len() <= capacity);
        }
    }
}
