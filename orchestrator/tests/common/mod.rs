// orchestrator/tests/common/mod.rs

#![allow(dead_code)]

use async_trait::async_trait;
use gate_core::{ChatMessage, CompletionClient, LlmError};
use orchestrator::DecisionOrchestrator;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const LLM_TIMEOUT: Duration = Duration::from_millis(5_000);

pub enum Reply {
    Text(String),
    Fail,
    Hang,
    Panic,
    /// One `(delay_ms, text)` per call, in call order.
    Staggered(Vec<(u64, String)>),
}

/// Stand-in for the completion endpoint that records what it was asked.
pub struct ScriptedClient {
    reply: Reply,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<Value>>,
}

impl ScriptedClient {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self { reply, calls: AtomicUsize::new(0), last_messages: Mutex::new(Vec::new()) })
    }

    pub fn answering(text: &str) -> Arc<Self> {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<Value> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, messages: Vec<Value>) -> Result<String, LlmError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages;
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail => Err(LlmError::Transport("connection refused".to_string())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(r#"{"needs_memory": true, "confidence": 1.0}"#.to_string())
            }
            Reply::Panic => panic!("completion client bug"),
            Reply::Staggered(replies) => {
                let (delay_ms, text) = &replies[call % replies.len()];
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(text.clone())
            }
        }
    }
}

pub fn orchestrator_with(client: Arc<ScriptedClient>) -> DecisionOrchestrator {
    DecisionOrchestrator::with_client(client, LLM_TIMEOUT).unwrap()
}

pub fn ongoing_conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::user("I am drafting the quarterly plan for the platform team and need help structuring it."),
        ChatMessage::assistant("Sure. A common structure is goals, key results, risks and a staffing section at the end."),
        ChatMessage::user("Good, the risks part is the one I keep getting stuck on every single quarter."),
    ]
}
