// orchestrator/src/experts/memory_analyzer.rs

use gate_core::{ChatMessage, CompletionClient, LlmError, MemoryDecision};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::prompts::get_memory_decision_messages;

pub const DEFAULT_MODEL_CONFIDENCE: f64 = 0.7;
pub const HEURISTIC_CONFIDENCE: f64 = 0.6;
/// Floor applied to the rule hint when the model could not be reached.
pub const DEGRADED_MIN_CONFIDENCE: f64 = 0.6;
pub const DEFAULT_MODEL_REASONING: &str = "LLM decision";
pub const HEURISTIC_REASONING: &str = "Fallback parsing";

/// What the analyzer actually managed to do.
#[derive(Debug)]
pub enum Analysis {
    /// The model answered with a JSON object.
    Parsed(MemoryDecision),
    /// The model answered, but not with usable JSON.
    Heuristic(MemoryDecision),
    /// The model call failed or timed out; the rule hint stands in.
    Degraded { decision: MemoryDecision, error: LlmError },
}

impl Analysis {
    pub fn decision(&self) -> &MemoryDecision {
        match self {
            Analysis::Parsed(d) | Analysis::Heuristic(d) => d,
            Analysis::Degraded { decision, .. } => decision,
        }
    }

    pub fn into_decision(self) -> MemoryDecision {
        match self {
            Analysis::Parsed(d) | Analysis::Heuristic(d) => d,
            Analysis::Degraded { decision, .. } => decision,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Analysis::Parsed(_) => "parsed",
            Analysis::Heuristic(_) => "heuristic",
            Analysis::Degraded { .. } => "degraded",
        }
    }
}

pub struct MemoryAnalyzer {
    client: Arc<dyn CompletionClient>,
    timeout: Duration,
}

impl MemoryAnalyzer {
    pub fn new(client: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Always yields a usable decision; failures degrade to `rule_hint`.
    pub async fn analyze(
        &self,
        message: &str,
        recent_messages: &[ChatMessage],
        rule_hint: &MemoryDecision,
    ) -> MemoryDecision {
        self.run(message, recent_messages, rule_hint).await.into_decision()
    }

    pub async fn run(
        &self,
        message: &str,
        recent_messages: &[ChatMessage],
        rule_hint: &MemoryDecision,
    ) -> Analysis {
        let messages = get_memory_decision_messages(message, recent_messages, rule_hint);
        info!(client = self.client.name(), "[MemoryAnalyzer] Asking model for a memory decision");

        let outcome = match tokio::time::timeout(self.timeout, self.client.complete(messages)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout { timeout_ms: self.timeout.as_millis() as u64 }),
        };

        let analysis = match outcome {
            Ok(raw_text) => parse_model_response(&raw_text),
            Err(error) => {
                warn!(error = %error, "[MemoryAnalyzer] Model call failed, degrading to rule hint");
                Analysis::Degraded { decision: degrade_to_hint(rule_hint, &error), error }
            }
        };

        info!(
            analysis = analysis.kind(),
            needs_memory = analysis.decision().needs_memory,
            confidence = analysis.decision().confidence,
            "[MemoryAnalyzer] Analysis finished"
        );
        analysis
    }
}

pub fn parse_model_response(raw_text: &str) -> Analysis {
    let cleaned = strip_code_fences(raw_text);
    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(fields)) => Analysis::Parsed(decision_from_fields(&fields)),
        Ok(_) => {
            warn!("[MemoryAnalyzer] Model returned JSON that is not an object, using text heuristic");
            Analysis::Heuristic(heuristic_decision(raw_text))
        }
        Err(e) => {
            warn!(error = %e, "[MemoryAnalyzer] Model returned invalid JSON, using text heuristic");
            Analysis::Heuristic(heuristic_decision(raw_text))
        }
    }
}

pub fn degrade_to_hint(rule_hint: &MemoryDecision, error: &LlmError) -> MemoryDecision {
    MemoryDecision {
        needs_memory: rule_hint.needs_memory,
        confidence: rule_hint.confidence.max(DEGRADED_MIN_CONFIDENCE),
        triggers: rule_hint.triggers.clone(),
        reasoning: format!("LLM unavailable ({}); rule-based: {}", error, rule_hint.reasoning),
    }
}

fn strip_code_fences(raw_text: &str) -> &str {
    let mut text = raw_text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn decision_from_fields(fields: &Map<String, Value>) -> MemoryDecision {
    let needs_memory = fields.get("needs_memory").map(coerce_bool).unwrap_or(false);
    let confidence = fields
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_MODEL_CONFIDENCE);
    let reasoning = fields
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MODEL_REASONING)
        .to_string();
    let triggers = fields
        .get("triggers")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    MemoryDecision { needs_memory, confidence, triggers, reasoning }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn heuristic_decision(raw_text: &str) -> MemoryDecision {
    let lower = raw_text.to_lowercase();
    MemoryDecision {
        needs_memory: lower.contains("true") || lower.contains("needs_memory"),
        confidence: HEURISTIC_CONFIDENCE,
        triggers: Vec::new(),
        reasoning: HEURISTIC_REASONING.to_string(),
    }
}
