// orchestrator/src/lib.rs

pub mod cache;
pub mod error;
pub mod experts;
pub mod orchestrator;
pub mod prompts;
pub mod rules;
pub mod stats;

// Re-exported so callers can write `use orchestrator::DecisionOrchestrator`
pub use crate::cache::{cache_key, DecisionCache};
pub use crate::error::GateError;
pub use crate::experts::llm_client::HttpCompletionClient;
pub use crate::experts::memory_analyzer::{Analysis, MemoryAnalyzer};
pub use crate::orchestrator::DecisionOrchestrator;
pub use crate::rules::{RuleEvaluator, TriggerRule, TriggerRuleSet};
pub use crate::stats::DecisionStats;
