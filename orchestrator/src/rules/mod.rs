// orchestrator/src/rules/mod.rs

pub mod evaluator;
pub mod trigger_rules;

pub use evaluator::RuleEvaluator;
pub use trigger_rules::{RuleCategory, TriggerRule, TriggerRuleSet};
