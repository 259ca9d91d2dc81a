// gate_core/src/lib.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// 1. One turn of the recent conversation, as the pipeline hands it to us
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

// 2. The classification every layer produces: rule pass, cache and model analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDecision {
    pub needs_memory: bool,
    /// Always within [0, 1].
    pub confidence: f64,
    pub triggers: Vec<String>,
    pub reasoning: String,
}

/// Which layer produced the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionMethod {
    #[serde(rename = "rule-based")]
    RuleBased,
    #[serde(rename = "cached")]
    Cached,
    #[serde(rename = "llm")]
    Llm,
    #[serde(rename = "fallback")]
    Fallback,
}

impl DecisionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionMethod::RuleBased => "rule-based",
            DecisionMethod::Cached => "cached",
            DecisionMethod::Llm => "llm",
            DecisionMethod::Fallback => "fallback",
        }
    }
}

impl fmt::Display for DecisionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 3. The uniform result the gate hands back to the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResult {
    pub success: bool,
    pub needs_memory: bool,
    pub confidence: f64,
    pub reasoning: String,
    pub method: DecisionMethod,
    pub triggers: Vec<String>,
    /// Whole milliseconds spent in `decide`.
    #[serde(rename = "decisionTime")]
    pub decision_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DecisionResult {
    pub fn from_decision(decision: MemoryDecision, method: DecisionMethod, decision_time_ms: u64) -> Self {
        Self {
            success: true,
            needs_memory: decision.needs_memory,
            confidence: decision.confidence,
            reasoning: decision.reasoning,
            method,
            triggers: decision.triggers,
            decision_time_ms,
            error: None,
        }
    }
}

/// Read-only view of the running counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub memory_used: u64,
    pub memory_skipped: u64,
    pub cache_hits: u64,
    pub average_decision_time: f64,
    pub cache_size: usize,
    /// Percent of requests answered from the cache.
    pub cache_hit_rate: f64,
    /// Percent of requests that asked for memory.
    pub memory_usage_rate: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("completion endpoint unreachable: {0}")]
    Transport(String),

    #[error("completion endpoint returned an error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("completion timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("failed to parse completion envelope: {0}")]
    MalformedEnvelope(String),

    #[error("completion response contained no choices")]
    EmptyCompletion,
}

// 4. Seam towards the external completion model.
// Takes OpenAI-style `{"role", "content"}` messages and returns the raw assistant text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, messages: Vec<Value>) -> Result<String, LlmError>;
}
