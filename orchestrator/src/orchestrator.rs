// orchestrator/src/orchestrator.rs

use common_utils::GateConfig;
use futures_util::FutureExt;
use gate_core::{ChatMessage, CompletionClient, DecisionMethod, DecisionResult, MemoryDecision, StatsSnapshot};
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::cache::{cache_key, DecisionCache};
use crate::error::GateError;
use crate::experts::llm_client::HttpCompletionClient;
use crate::experts::memory_analyzer::MemoryAnalyzer;
use crate::rules::RuleEvaluator;
use crate::stats::DecisionStats;

/// Rule results at or above this confidence skip the cache and the model.
pub const RULE_CONFIDENCE_THRESHOLD: f64 = 0.9;
pub const FALLBACK_CONFIDENCE: f64 = 0.5;
pub const FALLBACK_REASONING: &str = "Decision engine error, skipping memory";

/// Entry point of the gate: rules, then cache, then model.
pub struct DecisionOrchestrator {
    evaluator: RuleEvaluator,
    cache: Mutex<DecisionCache>,
    analyzer: MemoryAnalyzer,
    stats: Mutex<DecisionStats>,
}

impl DecisionOrchestrator {
    pub fn new(config: &GateConfig) -> Result<Self, GateError> {
        let client = Arc::new(HttpCompletionClient::new(config)?);
        info!(url = client.chat_url(), "[DecisionOrchestrator] Using HTTP completion client");
        Self::with_client(client, Duration::from_millis(config.llm_timeout_ms))
    }

    pub fn with_client(client: Arc<dyn CompletionClient>, llm_timeout: Duration) -> Result<Self, GateError> {
        Ok(Self::with_parts(RuleEvaluator::new()?, DecisionCache::new(), MemoryAnalyzer::new(client, llm_timeout)))
    }

    pub fn with_parts(evaluator: RuleEvaluator, cache: DecisionCache, analyzer: MemoryAnalyzer) -> Self {
        Self {
            evaluator,
            cache: Mutex::new(cache),
            analyzer,
            stats: Mutex::new(DecisionStats::new()),
        }
    }

    /// Classifies one turn. Never fails: internal errors and panics become a "skip memory" fallback.
    pub async fn decide(
        &self,
        user_message: &str,
        _session: Option<&Value>,
        recent_messages: &[ChatMessage],
    ) -> DecisionResult {
        let started = Instant::now();

        let outcome = AssertUnwindSafe(self.try_decide(user_message, recent_messages))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(GateError::Panicked(panic_message(&*payload))));

        let result = match outcome {
            Ok((decision, method)) => {
                DecisionResult::from_decision(decision, method, elapsed_ms(started))
            }
            Err(e) => {
                error!(error = %e, "[DecisionOrchestrator] Decision failed, falling back to skip");
                fallback_result(&e, elapsed_ms(started))
            }
        };

        self.record(&result, started.elapsed());
        info!(
            method = %result.method,
            needs_memory = result.needs_memory,
            confidence = result.confidence,
            decision_time_ms = result.decision_time_ms,
            "[DecisionOrchestrator] Decision made"
        );
        result
    }

    async fn try_decide(
        &self,
        user_message: &str,
        recent_messages: &[ChatMessage],
    ) -> Result<(MemoryDecision, DecisionMethod), GateError> {
        let rule_decision = self.evaluator.evaluate(user_message, recent_messages);
        if rule_decision.confidence >= RULE_CONFIDENCE_THRESHOLD {
            debug!(triggers = ?rule_decision.triggers, "[DecisionOrchestrator] Rule pass is confident");
            return Ok((rule_decision, DecisionMethod::RuleBased));
        }

        let key = cache_key(user_message, recent_messages);
        let cached = self.lock_cache()?.get(&key);
        if let Some(decision) = cached {
            debug!(key = %key, "[DecisionOrchestrator] Cache hit");
            return Ok((decision, DecisionMethod::Cached));
        }
        debug!(key = %key, "[DecisionOrchestrator] Cache miss, consulting model");

        let decision = self.analyzer.analyze(user_message, recent_messages, &rule_decision).await;
        self.lock_cache()?.put(key, decision.clone());
        Ok((decision, DecisionMethod::Llm))
    }

    pub fn stats(&self) -> StatsSnapshot {
        let cache_size = self.cache.lock().unwrap_or_else(PoisonError::into_inner).len();
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).snapshot(cache_size)
    }

    /// Drops every cached decision. Also recovers a cache poisoned by a panicking holder.
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.cache.clear_poison();
        info!("[DecisionOrchestrator] Decision cache cleared");
    }

    pub fn reset_stats(&self) {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).reset();
    }

    fn lock_cache(&self) -> Result<MutexGuard<'_, DecisionCache>, GateError> {
        self.cache.lock().map_err(|_| GateError::StateUnavailable("decision cache"))
    }

    fn record(&self, result: &DecisionResult, elapsed: Duration) {
        // Counters stay meaningful even if a previous holder panicked
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(result.method, result.needs_memory, elapsed);
    }
}

fn fallback_result(e: &GateError, decision_time_ms: u64) -> DecisionResult {
    DecisionResult {
        success: true,
        needs_memory: false,
        confidence: FALLBACK_CONFIDENCE,
        reasoning: FALLBACK_REASONING.to_string(),
        method: DecisionMethod::Fallback,
        triggers: Vec::new(),
        decision_time_ms,
        error: Some(e.to_string()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
